// ww3nml/src/group.rs

//! Ordered namelist groups and their fixed text rendering.

use crate::value::NmlValue;
use std::fmt;

/// One `&NAME_NML ... /` group with its assignments in render order.
///
/// Entries are kept in the order they were pushed. Blocks push their fields
/// in declaration order, which is what makes rendering deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct NamelistGroup {
    name: String,
    prefix: String,
    entries: Vec<(String, NmlValue)>,
}

impl NamelistGroup {
    /// Create an empty group. `name` is the header without `&`
    /// (`DOMAIN_NML`), `prefix` the variable prefix (`DOMAIN`).
    pub fn new<N: Into<String>, P: Into<String>>(name: N, prefix: P) -> Self {
        Self {
            name: name.into().to_uppercase(),
            prefix: prefix.into().to_uppercase(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assignments as `(full path, value)` pairs.
    pub fn entries(&self) -> &[(String, NmlValue)] {
        &self.entries
    }

    /// Look up a value by full path, e.g. `DOMAIN%START`.
    pub fn get(&self, path: &str) -> Option<&NmlValue> {
        self.entries
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(path))
            .map(|(_, v)| v)
    }

    /// Set `PREFIX%FIELD`. Nested fields are given as `SUB%FIELD`.
    pub fn set<V: Into<NmlValue>>(&mut self, field: &str, value: V) -> &mut Self {
        let path = self.path(field);
        self.entries.push((path, value.into()));
        self
    }

    /// Set `PREFIX%FIELD` only when a value is present.
    pub fn set_opt<V: Into<NmlValue>>(&mut self, field: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(field, value);
        }
        self
    }

    /// Set an indexed record such as `INBND_POINT(1) = 1 1 F`, where the
    /// assignment target is the prefix itself.
    pub fn set_indexed<V: Into<NmlValue>>(&mut self, index: usize, value: V) -> &mut Self {
        let path = format!("{}({})", self.prefix, index);
        self.entries.push((path, value.into()));
        self
    }

    /// Set a field of an indexed element, e.g. `HOMOG_INPUT(2)%NAME`.
    pub fn set_element<V: Into<NmlValue>>(
        &mut self,
        index: usize,
        field: &str,
        value: V,
    ) -> &mut Self {
        let path = format!("{}({})%{}", self.prefix, index, field.to_uppercase());
        self.entries.push((path, value.into()));
        self
    }

    pub fn set_element_opt<V: Into<NmlValue>>(
        &mut self,
        index: usize,
        field: &str,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.set_element(index, field, value);
        }
        self
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_uppercase()
        } else {
            format!("{}%{}", self.prefix, field.to_uppercase())
        }
    }

    /// Render the group in WW3 namelist text form, newline terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push('&');
        out.push_str(&self.name);
        out.push('\n');
        for (path, value) in &self.entries {
            out.push_str(path);
            out.push_str(" = ");
            out.push_str(&value.to_fortran_string());
            out.push('\n');
        }
        out.push_str("/\n");
        out
    }
}

impl fmt::Display for NamelistGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let mut group = NamelistGroup::new("spectrum_nml", "spectrum");
        group.set("xfr", 1.1).set("nk", 32u32);
        assert_eq!(
            group.render(),
            "&SPECTRUM_NML\nSPECTRUM%XFR = 1.1\nSPECTRUM%NK = 32\n/\n"
        );
    }

    #[test]
    fn test_absent_values_are_omitted() {
        let mut group = NamelistGroup::new("RUN_NML", "RUN");
        group.set_opt("FLDRY", None::<bool>).set_opt("FLCX", Some(true));
        assert_eq!(group.len(), 1);
        assert!(group.get("RUN%FLDRY").is_none());
        assert_eq!(group.get("run%flcx"), Some(&NmlValue::Logical(true)));
    }

    #[test]
    fn test_nested_and_indexed_paths() {
        let mut group = NamelistGroup::new("HOMOG_INPUT_NML", "HOMOG_INPUT");
        group.set_element(1, "name", "WND");
        let mut points = NamelistGroup::new("INBND_POINT_NML", "INBND_POINT");
        points.set_indexed(2, vec![NmlValue::from(3u32), NmlValue::from(true)]);
        let mut input = NamelistGroup::new("INPUT_NML", "INPUT");
        input.set("FORCING%WINDS", "T");

        assert!(group.render().contains("HOMOG_INPUT(1)%NAME = 'WND'"));
        assert!(points.render().contains("INBND_POINT(2) = 3 T"));
        assert!(input.render().contains("INPUT%FORCING%WINDS = 'T'"));
    }

    #[test]
    fn test_empty_group_still_has_header_and_terminator() {
        let group = NamelistGroup::new("TRACK_NML", "TRACK");
        assert!(group.is_empty());
        assert_eq!(group.render(), "&TRACK_NML\n/\n");
    }
}
