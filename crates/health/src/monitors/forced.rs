use gslb_domain::config::{ForcedOutcome, ForcedParams};

pub fn check(params: &ForcedParams) -> (bool, String) {
    match params.status {
        ForcedOutcome::Up => (true, "forced up".to_string()),
        ForcedOutcome::Down => (false, "forced down".to_string()),
    }
}
