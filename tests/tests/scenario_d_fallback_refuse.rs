//! Scenario D — fallback=REFUSE on a DOWN pool (spec §8).

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gslb_domain::config::{Fallback, LbMethod};
use gslb_domain::{GlobalName, State, TopologyMap};
use gslb_distribution::protocol::Parameters;
use gslb_distribution::query::{handle_lookup, Context};
use gslb_distribution::state::DistSnapshot;

#[test]
fn down_pool_with_refuse_rejects_both_a_and_soa() {
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

    // No probe results applied: every member stays DOWN-equivalent
    // (Unknown, weight>0, not Up) so the pool is DOWN.
    let state = State::from_config(&config).unwrap();
    assert!(!state.pools[0].status());

    let mut rng = fastrand::Rng::with_seed(3);
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

    let a_response = handle_lookup(
        &ctx,
        &Parameters {
            qtype: Some("A".to_string()),
            qname: Some("x.test".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(a_response["result"].as_bool(), Some(false));

    let soa_response = handle_lookup(
        &ctx,
        &Parameters {
            qtype: Some("SOA".to_string()),
            qname: Some("x.test".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(soa_response["result"].as_bool(), Some(false));
}
