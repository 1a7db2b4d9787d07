//! Reference policy bundles for `ai-path`.
//!
//! Each bundle is data-driven over a [`TerrainMap`] and reports the map's version as its
//! reuse signature, so editing terrain invalidates cached searches automatically.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod flood;
pub mod influence;
pub mod step;
pub mod terrain;
pub mod trade;
pub mod unit;

pub use flood::{flood_area, label_areas, AreaFloodPolicy, AreaLabels};
pub use influence::{influence_cells, InfluencePolicy};
pub use step::StepPolicy;
pub use terrain::{Terrain, TerrainMap};
pub use trade::{trade_route, TradeDomain, TradeRoutePolicy, LAND_STEP, WATER_STEP};
pub use unit::{
    reachable_this_turn, DangerMode, PenaltyModel, UnitContext, UnitFacts, UnitMovePolicy,
    MOVE_WEIGHT, SINGLE_TURN,
};
