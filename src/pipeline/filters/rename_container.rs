//! Renames a container in the registry.

use crate::data::{ContainerRegistry, DataError, DataPath};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{require_name, Filter};
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};

#[derive(Debug, Clone, PartialEq)]
pub struct RenameContainer {
    pub container: String,
    pub new_name: String,
}

impl Default for RenameContainer {
    fn default() -> Self {
        Self {
            container: "ImageDataContainer".to_string(),
            new_name: String::new(),
        }
    }
}

impl Configurable for RenameContainer {
    const PARAMETERS: &'static [Parameter<Self>] = &[
        Parameter {
            name: "container",
            label: "Container",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.container.clone()),
            set: |f, v| f.container = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "new_name",
            label: "New Name",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.new_name.clone()),
            set: |f, v| f.new_name = v.as_str().unwrap_or_default().to_string(),
        },
    ];
}

impl RenameContainer {
    pub fn new(container: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            new_name: new_name.into(),
        }
    }

    /// The rename is structural, so both phases perform it.
    fn apply(&self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        ctx.check(require_name("container", &self.container));
        ctx.check(require_name("new_name", &self.new_name));
        if ctx.has_errors() {
            return;
        }
        match registry.rename(&self.container, &self.new_name) {
            Ok(()) => {}
            Err(err @ DataError::NotFound { .. }) => ctx.report(FilterError::missing(
                &DataPath::new(self.container.clone(), "", ""),
                err,
            )),
            Err(err) => ctx.report(err.into()),
        }
    }
}

impl Filter for RenameContainer {
    fn name(&self) -> &'static str {
        "rename_container"
    }

    fn group(&self) -> &'static str {
        "Core"
    }

    fn human_label(&self) -> &'static str {
        "Rename Container"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.apply(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.apply(registry, ctx);
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataContainer, Geometry};
    use crate::pipeline::context::Phase;
    use crate::pipeline::error::ErrorCode;
    use crate::pipeline::filters::testing::run;

    fn registry() -> ContainerRegistry {
        let mut registry = ContainerRegistry::new();
        for name in ["A", "B"] {
            registry
                .insert(DataContainer::new(name, Geometry::Vertex { vertices: 0 }))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_rename() {
        let mut registry = registry();
        let mut filter = RenameContainer::new("A", "C");
        assert!(run(&mut filter, &mut registry, Phase::Execute).is_empty());
        assert!(registry.contains("C"));
        assert!(!registry.contains("A"));
        assert_eq!(registry.get("C").unwrap().name(), "C");
    }

    #[test]
    fn test_rename_onto_existing_is_duplicate() {
        let mut registry = registry();
        let before = registry.clone();
        let mut filter = RenameContainer::new("A", "B");
        assert_eq!(
            run(&mut filter, &mut registry, Phase::Preflight),
            vec![ErrorCode::DuplicateName.code()]
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_rename_missing_container() {
        let mut registry = registry();
        let mut filter = RenameContainer::new("Z", "Y");
        assert_eq!(
            run(&mut filter, &mut registry, Phase::Preflight),
            vec![ErrorCode::MissingData.code()]
        );
    }

    #[test]
    fn test_empty_new_name() {
        let mut registry = registry();
        let mut filter = RenameContainer::new("A", "");
        assert_eq!(
            run(&mut filter, &mut registry, Phase::Preflight),
            vec![ErrorCode::InvalidParameter.code()]
        );
    }
}
