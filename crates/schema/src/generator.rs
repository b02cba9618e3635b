use std::collections::BTreeSet;

use minijinja::{context, Environment};
use pulse_core::{LockFile, Manifest};
use tracing::debug;

use crate::bundle::{SchemaBundle, SchemaUnit};
use crate::enums::{enum_types, ValueNaming};
use crate::error::SchemaError;
use crate::{PACKAGE, PACKAGE_DIR};

const DOMAIN_TEMPLATE: &str = "domain.proto";
const ENTITIES_TEMPLATE: &str = "entities.proto";
const ATTRIBUTES_TEMPLATE: &str = "attributes.proto";
const SERVICES_TEMPLATE: &str = "services.proto";

/// Renders proto units with templates compiled into the binary.
pub struct SchemaGenerator {
    env: Environment<'static>,
    naming: ValueNaming,
}

impl SchemaGenerator {
    pub fn new() -> Result<Self, SchemaError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_template(DOMAIN_TEMPLATE, include_str!("../templates/domain.proto.j2"))?;
        env.add_template(ENTITIES_TEMPLATE, include_str!("../templates/entities.proto.j2"))?;
        env.add_template(ATTRIBUTES_TEMPLATE, include_str!("../templates/attributes.proto.j2"))?;
        env.add_template(SERVICES_TEMPLATE, include_str!("../templates/services.proto.j2"))?;
        Ok(Self {
            env,
            naming: ValueNaming::default(),
        })
    }

    pub fn with_value_naming(mut self, naming: ValueNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Build every unit for `manifest` and its `lock`.
    ///
    /// A domain unit is emitted for each domain that has entities or enums,
    /// so every import in `entities.proto` resolves.
    pub fn generate(&self, manifest: &Manifest, lock: &LockFile) -> Result<SchemaBundle, SchemaError> {
        let mut enums = enum_types(&lock.attr_enums, self.naming);

        let domains: BTreeSet<String> = manifest
            .entities
            .iter()
            .map(|e| e.domain.clone())
            .filter(|d| !d.trim().is_empty())
            .chain(enums.keys().cloned())
            .collect();

        let mut units = vec![
            self.unit(ATTRIBUTES_TEMPLATE, context! { package => PACKAGE })?,
            self.unit(
                ENTITIES_TEMPLATE,
                context! { package => PACKAGE, package_dir => PACKAGE_DIR, domains => &domains },
            )?,
            self.unit(SERVICES_TEMPLATE, context! { package => PACKAGE })?,
        ];

        for domain in &domains {
            let domain_enums = enums.remove(domain).unwrap_or_default();
            debug!(domain = %domain, enums = domain_enums.len(), "Rendering domain unit");
            let content = self
                .env
                .get_template(DOMAIN_TEMPLATE)?
                .render(context! { package => PACKAGE, enums => domain_enums })?;
            units.push(SchemaUnit {
                path: format!("{PACKAGE_DIR}/{domain}.proto"),
                content,
            });
        }

        units.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(SchemaBundle { units })
    }

    fn unit(&self, template: &str, ctx: minijinja::Value) -> Result<SchemaUnit, SchemaError> {
        let content = self.env.get_template(template)?.render(ctx)?;
        Ok(SchemaUnit {
            path: format!("{PACKAGE_DIR}/{template}"),
            content,
        })
    }
}
