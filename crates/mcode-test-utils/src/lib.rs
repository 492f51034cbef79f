//! Testing utilities for mcode workspace
//!
//! Shared fixture graph and tracing setup.
//!
//! The fixture holds one iteration with:
//!
//! - `ed2.scalar1`: parameter `p1` (ratio scale, owner D1) with a D2
//!   subscription
//! - `ed1.scalar2\opt\ps1` / `ed1.scalar2\opt\ps2`: parameter `p2`, option
//!   and state dependent, owner D1
//! - `ed1.usage.scalar1`: override `o1` of `p1` on usage `usage` (of `ed2`),
//!   owner D1, with a D2 subscription
//! - `ed1.compound.cpt1` / `ed1.compound.cpt2`: compound parameter `p3`,
//!   owner D1, with a D2 subscription
//!
//! Domain D3 owns nothing and subscribes to nothing.

#![allow(missing_docs)]

use mcode_model::{
    ActualFiniteState, DesignOption, DomainOfExpertise, ElementDefinition, ElementUsage, Iid,
    InMemoryCache, Iteration, MeasurementScale, NumberSetKind, Parameter, ParameterBase,
    ParameterCore, ParameterOverride, ParameterOverrideValueSet, ParameterSubscription,
    ParameterSubscriptionValueSet, ParameterType, ParameterTypeComponent, ParameterValueSetBase,
    ScalarKind, ScaleKind, SwitchKind, Thing, ValueArray, ValueSet,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Fixed ids of the fixture graph
pub mod ids {
    use mcode_model::Iid;

    pub const ITERATION: Iid = Iid::from_u128(0x1000);

    pub const D1: Iid = Iid::from_u128(0x2001);
    pub const D2: Iid = Iid::from_u128(0x2002);
    pub const D3: Iid = Iid::from_u128(0x2003);

    pub const PT_SCALAR1: Iid = Iid::from_u128(0x3001);
    pub const PT_SCALAR2: Iid = Iid::from_u128(0x3002);
    pub const PT_COMPOUND: Iid = Iid::from_u128(0x3003);
    pub const PT_LABEL: Iid = Iid::from_u128(0x3004);
    pub const SCALE_KG: Iid = Iid::from_u128(0x3101);

    pub const OPT: Iid = Iid::from_u128(0x4001);
    pub const PS1: Iid = Iid::from_u128(0x4101);
    pub const PS2: Iid = Iid::from_u128(0x4102);
    pub const STATE_LIST: Iid = Iid::from_u128(0x4200);

    pub const ED1: Iid = Iid::from_u128(0x5001);
    pub const ED2: Iid = Iid::from_u128(0x5002);
    pub const USAGE: Iid = Iid::from_u128(0x5101);

    pub const P1: Iid = Iid::from_u128(0x6001);
    pub const P2: Iid = Iid::from_u128(0x6002);
    pub const P3: Iid = Iid::from_u128(0x6003);
    pub const O1: Iid = Iid::from_u128(0x6101);
    pub const SUB_P1_D2: Iid = Iid::from_u128(0x6201);
    pub const SUB_P3_D2: Iid = Iid::from_u128(0x6202);
    pub const SUB_O1_D2: Iid = Iid::from_u128(0x6203);

    pub const VS_P1: Iid = Iid::from_u128(0x7001);
    pub const VS_P2_PS1: Iid = Iid::from_u128(0x7002);
    pub const VS_P2_PS2: Iid = Iid::from_u128(0x7003);
    pub const VS_P3: Iid = Iid::from_u128(0x7004);
    pub const VS_O1: Iid = Iid::from_u128(0x7101);
    pub const VS_SUB_P1_D2: Iid = Iid::from_u128(0x7201);
    pub const VS_SUB_P3_D2: Iid = Iid::from_u128(0x7202);
    pub const VS_SUB_O1_D2: Iid = Iid::from_u128(0x7203);
}

use ids::*;

/// Every value-set model code the fixture resolves
pub const VALUE_SET_CODES: &[&str] = &[
    "ed2.scalar1",
    "ed1.scalar2\\opt\\ps1",
    "ed1.scalar2\\opt\\ps2",
    "ed1.usage.scalar1",
    "ed1.compound.cpt1",
    "ed1.compound.cpt2",
];

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn values<const N: usize>(values: [&str; N]) -> ValueArray {
    values.into_iter().collect()
}

fn core(iid: Iid, container: Iid, owner: Iid, parameter_type: Iid) -> ParameterCore {
    ParameterCore {
        iid,
        container,
        owner,
        parameter_type,
        scale: None,
        is_option_dependent: false,
        state_dependence: None,
        value_set: Vec::new(),
    }
}

fn value_set(iid: Iid, container: Iid, owner: Iid, slots: [ValueArray; 4]) -> ParameterValueSetBase {
    let [manual, computed, reference, published] = slots;
    ParameterValueSetBase {
        iid,
        container,
        owner,
        manual,
        computed,
        reference,
        published,
        value_switch: SwitchKind::Manual,
        actual_option: None,
        actual_state: None,
    }
}

/// Cache a subscription of `domain` on `container`, with its single
/// value-set
#[allow(clippy::too_many_arguments)]
pub fn subscribe(
    cache: &InMemoryCache,
    domain: Iid,
    iid: Iid,
    container: Iid,
    parameter_type: Iid,
    scale: Option<Iid>,
    value_set: Iid,
    subscribed_value_set: Iid,
    manual: ValueArray,
) {
    let mut sub = core(iid, container, domain, parameter_type);
    sub.scale = scale;
    sub.value_set = vec![value_set];
    cache.insert(
        Thing::ParameterBase(ParameterBase::Subscription(ParameterSubscription { core: sub })),
        ITERATION,
    );
    cache.insert(
        Thing::ValueSet(ValueSet::Subscription(ParameterSubscriptionValueSet {
            iid: value_set,
            container: iid,
            owner: domain,
            manual,
            value_switch: SwitchKind::Manual,
            subscribed_value_set,
        })),
        ITERATION,
    );
}

/// Build the fixture cache
#[must_use]
pub fn build_cache() -> InMemoryCache {
    let cache = InMemoryCache::new();
    let put = |thing: Thing| {
        cache.insert(thing, ITERATION);
    };

    // Site directory
    for (iid, short_name) in [(D1, "D1"), (D2, "D2"), (D3, "D3")] {
        put(Thing::DomainOfExpertise(DomainOfExpertise {
            iid,
            short_name: short_name.into(),
            name: format!("Domain {short_name}"),
        }));
    }
    put(Thing::MeasurementScale(
        MeasurementScale::new(SCALE_KG, "kg", ScaleKind::Ratio, NumberSetKind::Real)
            .with_minimum(0.0, true),
    ));
    put(Thing::ParameterType(ParameterType::simple(
        PT_SCALAR1,
        "scalar1",
        ScalarKind::Quantity,
    )));
    put(Thing::ParameterType(ParameterType::simple(
        PT_SCALAR2,
        "scalar2",
        ScalarKind::Quantity,
    )));
    put(Thing::ParameterType(ParameterType::simple(
        PT_LABEL,
        "label",
        ScalarKind::Text {
            pattern: Some("[a-z]+".into()),
        },
    )));
    put(Thing::ParameterType(ParameterType::compound(
        PT_COMPOUND,
        "compound",
        vec![
            ParameterTypeComponent {
                short_name: "cpt1".into(),
                parameter_type: PT_SCALAR1,
                scale: Some(SCALE_KG),
            },
            ParameterTypeComponent {
                short_name: "cpt2".into(),
                parameter_type: PT_LABEL,
                scale: None,
            },
        ],
    )));

    // Iteration structure
    put(Thing::Iteration(Iteration {
        iid: ITERATION,
        element: vec![ED1, ED2],
        option: vec![OPT],
        actual_finite_state: vec![PS1, PS2],
    }));
    put(Thing::Option(DesignOption {
        iid: OPT,
        short_name: "opt".into(),
    }));
    for (iid, short_name) in [(PS1, "ps1"), (PS2, "ps2")] {
        put(Thing::ActualFiniteState(ActualFiniteState {
            iid,
            short_name: short_name.into(),
        }));
    }
    put(Thing::ElementDefinition(ElementDefinition {
        iid: ED1,
        container: ITERATION,
        short_name: "ed1".into(),
        owner: D1,
        parameter: vec![P2, P3],
        contained_element: vec![USAGE],
    }));
    put(Thing::ElementDefinition(ElementDefinition {
        iid: ED2,
        container: ITERATION,
        short_name: "ed2".into(),
        owner: D1,
        parameter: vec![P1],
        contained_element: Vec::new(),
    }));
    put(Thing::ElementUsage(ElementUsage {
        iid: USAGE,
        container: ED1,
        short_name: "usage".into(),
        owner: D1,
        element_definition: ED2,
        parameter_override: vec![O1],
    }));

    // p1 and its D2 subscription
    let mut p1 = core(P1, ED2, D1, PT_SCALAR1);
    p1.scale = Some(SCALE_KG);
    p1.value_set = vec![VS_P1];
    put(Thing::ParameterBase(ParameterBase::Parameter(Parameter {
        core: p1,
        subscription: vec![SUB_P1_D2],
    })));
    put(Thing::ValueSet(ValueSet::Parameter(value_set(
        VS_P1,
        P1,
        D1,
        [values(["1"]), values(["2"]), values(["3"]), values(["4"])],
    ))));

    let mut sub = core(SUB_P1_D2, P1, D2, PT_SCALAR1);
    sub.scale = Some(SCALE_KG);
    sub.value_set = vec![VS_SUB_P1_D2];
    put(Thing::ParameterBase(ParameterBase::Subscription(
        ParameterSubscription { core: sub },
    )));
    put(Thing::ValueSet(ValueSet::Subscription(
        ParameterSubscriptionValueSet {
            iid: VS_SUB_P1_D2,
            container: SUB_P1_D2,
            owner: D2,
            manual: values(["-"]),
            value_switch: SwitchKind::Manual,
            subscribed_value_set: VS_P1,
        },
    )));

    // p2, option and state dependent
    let mut p2 = core(P2, ED1, D1, PT_SCALAR2);
    p2.scale = Some(SCALE_KG);
    p2.is_option_dependent = true;
    p2.state_dependence = Some(STATE_LIST);
    p2.value_set = vec![VS_P2_PS1, VS_P2_PS2];
    put(Thing::ParameterBase(ParameterBase::Parameter(Parameter {
        core: p2,
        subscription: Vec::new(),
    })));
    for (iid, state, manual) in [(VS_P2_PS1, PS1, "10"), (VS_P2_PS2, PS2, "20")] {
        let mut vs = value_set(
            iid,
            P2,
            D1,
            [values([manual]), values(["-"]), values(["-"]), values(["-"])],
        );
        vs.actual_option = Some(OPT);
        vs.actual_state = Some(state);
        put(Thing::ValueSet(ValueSet::Parameter(vs)));
    }

    // o1 overrides p1 on usage
    let mut o1 = core(O1, USAGE, D1, PT_SCALAR1);
    o1.scale = Some(SCALE_KG);
    o1.value_set = vec![VS_O1];
    put(Thing::ParameterBase(ParameterBase::Override(ParameterOverride {
        core: o1,
        parameter: P1,
        subscription: vec![SUB_O1_D2],
    })));
    put(Thing::ValueSet(ValueSet::Override(ParameterOverrideValueSet {
        base: value_set(
            VS_O1,
            O1,
            D1,
            [values(["11"]), values(["12"]), values(["13"]), values(["14"])],
        ),
        parameter_value_set: VS_P1,
    })));
    subscribe(
        &cache,
        D2,
        SUB_O1_D2,
        O1,
        PT_SCALAR1,
        Some(SCALE_KG),
        VS_SUB_O1_D2,
        VS_O1,
        values(["-"]),
    );

    // p3, compound
    let mut p3 = core(P3, ED1, D1, PT_COMPOUND);
    p3.value_set = vec![VS_P3];
    put(Thing::ParameterBase(ParameterBase::Parameter(Parameter {
        core: p3,
        subscription: vec![SUB_P3_D2],
    })));
    put(Thing::ValueSet(ValueSet::Parameter(value_set(
        VS_P3,
        P3,
        D1,
        [
            values(["1", "a"]),
            values(["2", "b"]),
            values(["3", "c"]),
            values(["4", "d"]),
        ],
    ))));
    subscribe(
        &cache,
        D2,
        SUB_P3_D2,
        P3,
        PT_COMPOUND,
        None,
        VS_SUB_P3_D2,
        VS_P3,
        values(["5", "e"]),
    );

    cache
}

/// The fixture cache, shared
#[must_use]
pub fn shared_cache() -> Arc<InMemoryCache> {
    Arc::new(build_cache())
}
