//! Scenario A — WRR UP rotation (spec §8).

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gslb_domain::config::{Fallback, LbMethod};
use gslb_domain::{GlobalName, State, TopologyMap};
use gslb_distribution::query::{handle_lookup, Context};
use gslb_distribution::protocol::Parameters;
use gslb_distribution::state::DistSnapshot;

fn lookup_once(ctx: &Context) -> String {
    let response = handle_lookup(
        ctx,
        &Parameters {
            qtype: Some("A".to_string()),
            qname: Some("x.test".to_string()),
            ..Default::default()
        },
    );
    let records = response["result"].as_array().expect("lookup should succeed");
    assert_eq!(records.len(), 1, "max_addrs_returned=1 must cap replies at one record");
    records[0]["content"].as_str().unwrap().to_string()
}

#[test]
fn three_lookups_split_between_weighted_members() {
    let config = support::config_with(
        vec![(
            "p",
            support::pool_config(
                vec![support::member("10.0.0.1", "a", 1), support::member("10.0.0.2", "b", 1)],
                LbMethod::Wrr,
                Fallback::Any,
                1,
            ),
        )],
        vec![("x.test.", "p", 1)],
        vec![],
    );

    let mut state = State::from_config(&config).unwrap();
    support::bring_all_up(&mut state);

    let mut rng = fastrand::Rng::with_seed(7);
    let form = state.to_distribution_form(&mut rng);
    let snapshot = DistSnapshot::from_wire(&form, 1700000000.0, None);

    let mut globalnames = HashMap::new();
    let gn = GlobalName::from_config("x.test.", &config.lb.globalnames["x.test."]);
    globalnames.insert(gn.name.clone(), gn);

    let ctx = Context {
        globalnames,
        topology: TopologyMap::from_config(&config.topology).unwrap(),
        soa: config.base.soa.clone(),
        snapshot: Arc::new(ArcSwap::from_pointee(snapshot)),
    };

    // Rotation length 2, weights 1:1 — across 3 consecutive lookups both
    // members must appear, and neither more than twice (one full cycle plus
    // one extra draw, regardless of the random starting cursor).
    let seen = [lookup_once(&ctx), lookup_once(&ctx), lookup_once(&ctx)];
    let a_count = seen.iter().filter(|ip| *ip == "10.0.0.1").count();
    let b_count = seen.iter().filter(|ip| *ip == "10.0.0.2").count();
    assert_eq!(a_count + b_count, 3);
    assert!(a_count >= 1 && b_count >= 1, "both weighted members must appear: {seen:?}");
    assert!(a_count <= 2 && b_count <= 2);
}
