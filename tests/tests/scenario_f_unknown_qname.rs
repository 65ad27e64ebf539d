//! Scenario F — unknown qname (spec §8).

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
fn lookup_for_unregistered_name_returns_false() {
    let config = support::config_with(
        vec![(
            "p",
            support::pool_config(
                vec![support::member("10.0.0.1", "a", 1)],
                LbMethod::Wrr,
                Fallback::Any,
                1,
            ),
        )],
        vec![("known.", "p", 1)],
        vec![],
    );

    let mut state = State::from_config(&config).unwrap();
    support::bring_all_up(&mut state);

    let mut rng = fastrand::Rng::with_seed(1);
    let form = state.to_distribution_form(&mut rng);
    let snapshot = DistSnapshot::from_wire(&form, 1700000000.0, None);

    let mut globalnames = HashMap::new();
    let gn = GlobalName::from_config("known.", &config.lb.globalnames["known."]);
    globalnames.insert(gn.name.clone(), gn);

    let ctx = Context {
        globalnames,
        topology: TopologyMap::from_config(&config.topology).unwrap(),
        soa: config.base.soa.clone(),
        snapshot: Arc::new(ArcSwap::from_pointee(snapshot)),
    };

    let response = handle_lookup(
        &ctx,
        &Parameters {
            qtype: Some("A".to_string()),
            qname: Some("unknown.".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(response["result"].as_bool(), Some(false));
}
