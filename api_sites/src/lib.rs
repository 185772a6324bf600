use actix_web::web::{self};

pub mod routes {
    pub mod project;
    pub mod public;
    pub mod site;
}

mod services {
    pub(crate) mod project;
    pub(crate) mod public;
    pub(crate) mod site;
}

mod dtos {
    pub(crate) mod gated;
    pub(crate) mod project;
    pub(crate) mod site;
}

mod misc {
    pub(crate) mod slug;
}

pub fn mount_projects() -> actix_web::Scope {
    web::scope("/projects")
        .service(routes::project::get_projects)
        .service(routes::project::post_project)
        .service(routes::project::delete_project)
}
pub fn mount_site() -> actix_web::Scope {
    web::scope("/site")
        .service(routes::site::get_site)
        .service(routes::site::put_site)
        .service(routes::site::put_theme)
        .service(routes::site::put_layout)
}
pub fn mount_public() -> actix_web::Scope {
    web::scope("/sites").service(routes::public::get_public_site)
}
