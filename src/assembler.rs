use crate::config::ConfigEntry;
use crate::nat_instance::build_nat_instance;
use crate::security_group::build_nat_security_group;
use crate::template::Template;

/// Merges the NAT security group and, when the entry is usable, the NAT
/// instance resources into one template.
pub fn assemble(config_entry: &ConfigEntry) -> Template {
    let mut template = Template::new(config_entry.description.clone());
    template.merge(build_nat_security_group());

    let options = config_entry.nat_instance_options();
    let image_id = config_entry.image_id.as_deref().unwrap_or_default();
    let nat_instance = build_nat_instance(
        image_id,
        &config_entry.instance_type,
        &config_entry.zones,
        &options,
        &config_entry.network_naming(),
    );

    if nat_instance.is_empty() {
        tracing::warn!(
            name = %options.name,
            image_id,
            zones = config_entry.zones.len(),
            "Skipping the NAT instance, check the image ID, zones and name"
        );
    } else {
        tracing::debug!(name = %options.name, "Built the NAT instance resources");
        template.merge(nat_instance);
    }

    return template;
}
