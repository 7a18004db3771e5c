// Read-only data sources.

mod cbr_account_settings;
mod cbr_rule;
mod cbr_zone;
mod is_instance_network_interface;
mod schematics_state;

pub use cbr_account_settings::CbrAccountSettings;
pub use cbr_rule::CbrRule;
pub use cbr_zone::CbrZone;
pub use is_instance_network_interface::InstanceNetworkInterface;
pub use schematics_state::SchematicsState;

use crate::provider::DataSource;

pub(crate) fn all() -> Vec<Box<dyn DataSource>> {
    vec![
        Box::new(InstanceNetworkInterface),
        Box::new(SchematicsState),
        Box::new(CbrZone),
        Box::new(CbrRule),
        Box::new(CbrAccountSettings),
    ]
}
