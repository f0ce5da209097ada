//! The filter contract.
//!
//! A filter has two entry points over the same [`ContainerRegistry`]:
//!
//! - `preflight` checks parameters and required inputs and declares its
//!   outputs as zero-tuple placeholders, without computing anything.
//! - `execute` repeats those checks on the real data, creates its outputs at
//!   their real size and fills them.
//!
//! Both report problems through [`FilterContext`] rather than returning early
//! with an error, so a pipeline can collect every preflight problem at once.

use crate::data::{AttributeGroup, ContainerRegistry, DataArray, DataPath, ImageGeometry};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::parameter::ParameterAccess;
use crate::types::{ElementType, GeometryKind, GroupKind};

/// A unit of work in a pipeline.
pub trait Filter: ParameterAccess + Send {
    /// Stable identifier, used in pipeline files.
    fn name(&self) -> &'static str;

    /// Category shown when listing filters.
    fn group(&self) -> &'static str;

    fn human_label(&self) -> &'static str;

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext);

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext);

    /// Independent copy with the same parameter values.
    fn clone_filter(&self) -> Box<dyn Filter>;
}

impl std::fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter").field("name", &self.name()).finish()
    }
}

/// Check that a parameter name is usable as a container, group or array name.
pub fn require_name(parameter: &str, value: &str) -> Result<(), FilterError> {
    if value.is_empty() {
        return Err(FilterError::invalid(parameter, "name must not be empty"));
    }
    if value.contains('/') {
        return Err(FilterError::invalid(parameter, "name must not contain '/'"));
    }
    Ok(())
}

/// Check that a path parameter names all three levels.
pub fn require_complete(parameter: &str, path: &DataPath) -> Result<(), FilterError> {
    if !path.is_complete() {
        return Err(FilterError::invalid(
            parameter,
            format!("'{}' must name a container, group and array", path),
        ));
    }
    Ok(())
}

/// Resolve an input group, mapping lookup failures to `MissingData`.
pub fn require_group<'r>(
    registry: &'r ContainerRegistry,
    path: &DataPath,
) -> Result<&'r AttributeGroup, FilterError> {
    registry
        .group(path)
        .map_err(|e| FilterError::missing(path, e))
}

/// Resolve an input array and check its element type and component count.
pub fn require_array<'r>(
    registry: &'r ContainerRegistry,
    path: &DataPath,
    element_type: ElementType,
    components: usize,
) -> Result<&'r DataArray, FilterError> {
    let array = registry
        .array(path)
        .map_err(|e| FilterError::missing(path, e))?;
    array.check_layout(element_type, components)?;
    Ok(array)
}

/// Resolve an input array of any numeric type with one component.
pub fn require_scalar<'r>(
    registry: &'r ContainerRegistry,
    path: &DataPath,
) -> Result<&'r DataArray, FilterError> {
    let array = registry
        .array(path)
        .map_err(|e| FilterError::missing(path, e))?;
    if array.component_count() != 1 {
        return Err(FilterError::Data(crate::data::DataError::TypeMismatch {
            array: path.to_string(),
            expected_type: array.element_type(),
            expected_components: 1,
            actual_type: array.element_type(),
            actual_components: array.component_count(),
        }));
    }
    Ok(array)
}

/// Resolve the image geometry of a container and check that its groups
/// agree with it. Zero-tuple groups pass when `allow_placeholders` is set,
/// which preflight needs.
pub fn require_image<'r>(
    registry: &'r ContainerRegistry,
    container: &str,
    allow_placeholders: bool,
) -> Result<&'r ImageGeometry, FilterError> {
    let found = registry
        .get(container)
        .map_err(|e| FilterError::missing(&DataPath::new(container, "", ""), e))?;
    let geometry = found.geometry();
    let image = geometry
        .as_image()
        .filter(|_| geometry.kind().provides(GeometryKind::Image))
        .ok_or_else(|| {
            FilterError::invalid(
                "container",
                format!(
                    "'{}' has a {} geometry, an image geometry is required",
                    container,
                    geometry.kind()
                ),
            )
        })?;
    found.validate(allow_placeholders)?;
    Ok(image)
}

/// Check that an existing group has the expected kind.
pub fn require_group_kind(
    group: &AttributeGroup,
    kind: GroupKind,
    parameter: &str,
) -> Result<(), FilterError> {
    if group.kind() != kind {
        return Err(FilterError::invalid(
            parameter,
            format!(
                "group '{}' holds {} data, {} data is required",
                group.name(),
                group.kind(),
                kind
            ),
        ));
    }
    Ok(())
}
