//! Scenario B — retry hysteresis (spec §8). Unit-level coverage of the same
//! rule lives in `gslb-domain`'s own test module; this drives it through the
//! full distribution-form-then-lookup pipeline, the way an end-to-end
//! scenario would.

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gslb_domain::config::{Fallback, LbMethod};
use gslb_domain::{GlobalName, ProbeResult, State, TopologyMap};
use gslb_distribution::protocol::Parameters;
use gslb_distribution::query::{handle_lookup, Context};
use gslb_distribution::state::DistSnapshot;

fn single_member_state() -> State {
    let config = support::config_with(
        vec![(
            "p",
            support::pool_config(
                vec![support::member("10.0.0.1", "a", 1)],
                LbMethod::Wrr,
                Fallback::Refuse,
                1,
            ),
        )],
        vec![("x.test.", "p", 1)],
        vec![],
    );
    State::from_config(&config).unwrap()
}

fn ctx_from(state: &State, globalname_cfg: &gslb_domain::config::GlobalNameConfig) -> Context {
    let mut rng = fastrand::Rng::with_seed(3);
    let form = state.to_distribution_form(&mut rng);
    let snapshot = DistSnapshot::from_wire(&form, 1700000000.0, None);

    let mut globalnames = HashMap::new();
    let gn = GlobalName::from_config("x.test.", globalname_cfg);
    globalnames.insert(gn.name.clone(), gn);

    Context {
        globalnames,
        topology: TopologyMap::from_config(&Default::default()).unwrap(),
        soa: Default::default(),
        snapshot: Arc::new(ArcSwap::from_pointee(snapshot)),
    }
}

#[test]
fn member_survives_two_failures_then_goes_down_on_the_third() {
    let mut state = single_member_state();

    // Member is brought UP first (retries reset to the monitor's
    // configured count, 2 by the shared tcp_connect fixture).
    state.apply_probe_result(
        ProbeResult {
            pool_id: 0,
            member_id: 0,
            success: true,
            reason: "ok".to_string(),
        },
        1.0,
    );
    assert!(state.pools[0].status(), "pool must be UP after the member comes up");

    let gn_cfg = gslb_domain::config::GlobalNameConfig {
        pool: "p".to_string(),
        ttl: 1,
        nsrecord: false,
    };

    let fail = |state: &mut State, ts: f64| {
        state.apply_probe_result(
            ProbeResult {
                pool_id: 0,
                member_id: 0,
                success: false,
                reason: "timeout".to_string(),
            },
            ts,
        )
    };

    // Two failures: retries_left goes 2 -> 1 -> 0, member stays UP, pool
    // keeps answering lookups.
    assert!(fail(&mut state, 2.0).is_none());
    assert!(fail(&mut state, 3.0).is_none());
    assert!(state.pools[0].status());
    let ctx = ctx_from(&state, &gn_cfg);
    let response = handle_lookup(
        &ctx,
        &Parameters {
            qtype: Some("A".to_string()),
            qname: Some("x.test".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        response["result"][0]["content"].as_str().unwrap(),
        "10.0.0.1"
    );

    // Third consecutive failure: member goes DOWN, and since it was the
    // pool's only UP member, the pool itself goes DOWN too. With
    // fallback=refuse this must now refuse both A and SOA.
    let transition = fail(&mut state, 4.0).expect("third failure must transition the member");
    assert_eq!(transition.pool_status_changed, Some(false));
    assert!(!state.pools[0].status());

    let ctx = ctx_from(&state, &gn_cfg);
    let a_response = handle_lookup(
        &ctx,
        &Parameters {
            qtype: Some("A".to_string()),
            qname: Some("x.test".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(a_response, serde_json::json!({"result": false}));
}
