pub mod config;
pub mod purchase;
pub mod record;
pub mod system;
pub mod wizard;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    let groups = [
        system::definitions(),
        wizard::definitions(),
        purchase::definitions(),
        config::definitions(),
        record::definitions(),
    ];
    for entry in groups.into_iter().flatten() {
        registry.register(entry);
    }
}
