use actix_web::{HttpResponse, http::StatusCode};
use plans::{Gate, UpgradePrompt};
use serde::Serialize;

/// Result of a gated action: performed, or refused with an upgrade prompt.
#[derive(Debug)]
pub enum Gated<T> {
    Done(T),
    UpgradeRequired(UpgradePrompt),
}

impl<T: Serialize> Gated<T> {
    /// Refusals are answered with 403 and the prompt as body.
    pub fn into_response(self, success: StatusCode) -> HttpResponse {
        match self {
            Gated::Done(body) => HttpResponse::build(success).json(body),
            Gated::UpgradeRequired(prompt) => HttpResponse::Forbidden().json(prompt),
        }
    }
}

impl<T> Gated<T> {
    /// Short-circuits with the prompt when the gate is closed.
    pub fn check(gate: Gate) -> Result<(), Gated<T>> {
        gate.into_result().map_err(Gated::UpgradeRequired)
    }
}

#[cfg(test)]
mod tests {
    use plans::Entitlements;

    use super::*;

    #[test]
    fn refused_action_is_forbidden_with_prompt() {
        let gated: Gated<()> = Gated::check(Gate::layout("academic", &Entitlements::free()))
            .unwrap_err();
        let res = gated.into_response(StatusCode::OK);
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn performed_action_uses_success_status() {
        let res = Gated::Done(serde_json::json!({ "id": 1 })).into_response(StatusCode::CREATED);
        assert_eq!(res.status(), StatusCode::CREATED);
    }
}
