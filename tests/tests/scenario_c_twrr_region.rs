//! Scenario C — TWRR regional match (spec §8).

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gslb_domain::config::{Fallback, LbMethod};
use gslb_domain::{GlobalName, State, TopologyMap};
use gslb_distribution::protocol::Parameters;
use gslb_distribution::query::{handle_lookup, Context};
use gslb_distribution::state::DistSnapshot;

fn build_ctx() -> Context {
    let config = support::config_with(
        vec![(
            "p",
            support::pool_config(
                vec![
                    support::member_in("10.0.0.1", "a", 1, "us"),
                    support::member_in("10.0.0.2", "b", 1, "eu"),
                ],
                LbMethod::Twrr,
                Fallback::Any,
                1,
            ),
        )],
        vec![("x.test.", "p", 1)],
        vec![("us", vec!["10.0.0.0/8"])],
    );

    let mut state = State::from_config(&config).unwrap();
    support::bring_all_up(&mut state);

    let mut rng = fastrand::Rng::with_seed(11);
    let form = state.to_distribution_form(&mut rng);
    let snapshot = DistSnapshot::from_wire(&form, 1700000000.0, None);

    let mut globalnames = HashMap::new();
    let gn = GlobalName::from_config("x.test.", &config.lb.globalnames["x.test."]);
    globalnames.insert(gn.name.clone(), gn);

    Context {
        globalnames,
        topology: TopologyMap::from_config(&config.topology).unwrap(),
        soa: config.base.soa.clone(),
        snapshot: Arc::new(ArcSwap::from_pointee(snapshot)),
    }
}

fn lookup(ctx: &Context, remote: &str) -> String {
    let response = handle_lookup(
        ctx,
        &Parameters {
            qtype: Some("A".to_string()),
            qname: Some("x.test".to_string()),
            remote: Some(remote.to_string()),
            ..Default::default()
        },
    );
    response["result"][0]["content"].as_str().unwrap().to_string()
}

#[test]
fn remote_in_region_gets_regional_member_only() {
    let ctx = build_ctx();
    assert_eq!(lookup(&ctx, "10.1.2.3"), "10.0.0.1");
}

#[test]
fn remote_outside_any_region_falls_back_to_default() {
    let ctx = build_ctx();
    // _default contains both members (twrr UP pool); with a one-member
    // region table unmatched, the client falls through to _default, which
    // can return either weighted member.
    let content = lookup(&ctx, "192.168.0.1");
    assert!(content == "10.0.0.1" || content == "10.0.0.2");
}
