//! The meta-parameter surface: the only inputs a meta-operation accepts.

use lumaglow_core::{GraphError, ParamDescriptor, ParamValue, ParamValues, Result};

/// Declared parameters of one meta-operation variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSurface {
    descriptors: Vec<ParamDescriptor>,
}

impl ParamSurface {
    pub fn new(descriptors: Vec<ParamDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[ParamDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Result<&ParamDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| GraphError::UnknownMetaParameter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == name)
    }

    /// Every parameter at its default value.
    pub fn defaults(&self) -> ParamValues {
        self.descriptors
            .iter()
            .map(|d| (d.name.clone(), d.default.clone()))
            .collect()
    }

    /// Type-check and clamp a value for `name`.
    pub fn coerce(&self, name: &str, value: ParamValue) -> Result<ParamValue> {
        self.descriptor(name)?.coerce(value)
    }

    /// Defaults overlaid with `overrides`, each override coerced.
    pub fn resolve(&self, overrides: &ParamValues) -> Result<ParamValues> {
        let mut values = self.defaults();
        for (name, value) in overrides {
            let value = self.coerce(name, value.clone())?;
            values.insert(name.clone(), value);
        }
        Ok(values)
    }

    /// Parse `name=value` into a coerced pair.
    pub fn parse_assignment(&self, text: &str) -> Result<(String, ParamValue)> {
        let (name, raw) = text
            .split_once('=')
            .ok_or_else(|| GraphError::Parse(format!("expected name=value, got {text:?}")))?;
        let name = name.trim();
        let value = self.descriptor(name)?.parse(raw)?;
        Ok((name.to_string(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumaglow_core::Color;

    fn surface() -> ParamSurface {
        ParamSurface::new(vec![
            ParamDescriptor::new("gaussian", "Blur", ParamValue::Float(6.0)).with_range(0.0, 95.0),
            ParamDescriptor::new("value", "Color", ParamValue::Color(Color::WHITE)),
        ])
    }

    #[test]
    fn test_resolve_overlays_defaults() {
        let overrides: ParamValues = [("gaussian".to_string(), ParamValue::Float(200.0))].into_iter().collect();
        let values = surface().resolve(&overrides).unwrap();
        assert_eq!(values["gaussian"], ParamValue::Float(95.0));
        assert_eq!(values["value"], ParamValue::Color(Color::WHITE));
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = surface().coerce("radius", ParamValue::Float(1.0)).unwrap_err();
        assert_eq!(err, GraphError::UnknownMetaParameter("radius".into()));
    }

    #[test]
    fn test_parse_assignment() {
        let (name, value) = surface().parse_assignment("value=#ff9dff").unwrap();
        assert_eq!(name, "value");
        assert_eq!(value.as_color().unwrap().to_hex(), "#ff9dff");
        assert!(surface().parse_assignment("gaussian").is_err());
        assert!(surface().parse_assignment("gaussian=wide").is_err());
    }
}
