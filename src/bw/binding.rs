//! Declared parameters and their field bindings.

use alloc::string::String;
use alloc::vec::Vec;

use super::tree::BindingNode;
use crate::IndexMap;

/// How a declared parameter obtains its value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParameterBinding {
    /// Copied straight from a field (`<xsl:value-of select=".../FIELD"/>`).
    Direct(String),
    /// Copied from a field only when it exists
    /// (`<xsl:choose><xsl:when test="exists(.../FIELD)">`).
    Conditional(String),
}

impl ParameterBinding {
    /// The bound field name.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Direct(field) | Self::Conditional(field) => field,
        }
    }
}

/// Parameter names declared on a statement and the fields bound to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderBinding {
    declared: Vec<String>,
    bindings: IndexMap<String, ParameterBinding>,
}

impl PlaceholderBinding {
    /// Declare parameters in placeholder order, none bound yet.
    #[must_use]
    pub fn new(declared: &[String]) -> Self {
        Self {
            declared: declared.to_vec(),
            bindings: IndexMap::default(),
        }
    }

    /// Bind a declared parameter.
    #[must_use]
    pub fn with_binding(mut self, name: &str, binding: ParameterBinding) -> Self {
        self.bindings.insert(name.into(), binding);
        self
    }

    /// Look up the binding of every declared parameter in the input mapping
    /// of a statement.
    ///
    /// The lookup scope is the `Record` element iterated by the
    /// `jdbcUpdateActivityInput` mapping. Without a `for-each`/`Record` the
    /// input element itself is searched, and without a
    /// `jdbcUpdateActivityInput` the whole `input` tree. Each parameter is
    /// bound through the first element named after it: a `value-of` outside
    /// any `choose` wins, then an `exists(...)` test of a `when`, then any
    /// nested `value-of`. Parameters with no element stay unbound.
    #[must_use]
    pub fn build(declared: &[String], input: Option<&BindingNode>) -> Self {
        let mut binding = Self::new(declared);
        let Some(input) = input else {
            return binding;
        };

        let scope = input.find("jdbcUpdateActivityInput").unwrap_or(input);
        let record = scope
            .find("for-each")
            .and_then(|for_each| for_each.child("Record"))
            .unwrap_or(scope);

        for name in declared {
            match record.find(name).and_then(parameter_binding) {
                Some(found) => {
                    tracing::debug!(parameter = %name, field = found.field(), "Bound parameter");
                    binding.bindings.insert(name.clone(), found);
                }
                None => tracing::warn!(parameter = %name, "No binding for declared parameter"),
            }
        }
        binding
    }

    /// Declared parameter names, in placeholder order.
    #[must_use]
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    /// Whether `name` is a declared parameter.
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.iter().any(|declared| declared == name)
    }

    /// The binding of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterBinding> {
        self.bindings.get(name)
    }

    /// Declared parameters without a binding, in declaration order.
    pub fn unbound(&self) -> impl Iterator<Item = &str> {
        self.declared
            .iter()
            .filter(|name| !self.bindings.contains_key(name.as_str()))
            .map(String::as_str)
    }
}

/// Parameter names listed in the `Prepared_Param_DataType` block of an
/// activity, or `None` if the activity has no such block.
#[must_use]
pub fn declared_parameters(activity: &BindingNode) -> Option<Vec<String>> {
    let block = activity.find("Prepared_Param_DataType")?;
    Some(
        block
            .children_named("parameter")
            .filter_map(|parameter| parameter.child("parameterName"))
            .filter_map(BindingNode::text)
            .map(String::from)
            .collect(),
    )
}

fn parameter_binding(element: &BindingNode) -> Option<ParameterBinding> {
    if let Some(field) = element
        .find_outside("value-of", "choose")
        .and_then(selected_field)
    {
        return Some(ParameterBinding::Direct(field));
    }
    if let Some(field) = element
        .find("choose")
        .and_then(|choose| choose.find("when"))
        .and_then(|when| when.attribute("test"))
        .and_then(tested_field)
    {
        return Some(ParameterBinding::Conditional(field));
    }
    element
        .find("value-of")
        .and_then(selected_field)
        .map(ParameterBinding::Direct)
}

/// Last path step of a `select` expression: `$Start/root/FIELD` gives `FIELD`.
fn selected_field(value_of: &BindingNode) -> Option<String> {
    value_of
        .attribute("select")
        .and_then(last_step)
}

/// Field tested by `exists(...)`: `exists($Start/root/FIELD)` gives `FIELD`.
fn tested_field(test: &str) -> Option<String> {
    let start = test.find("exists(")? + "exists(".len();
    let end = start + test[start..].find(')')?;
    last_step(&test[start..end])
}

fn last_step(path: &str) -> Option<String> {
    let step = path.rsplit('/').next()?.trim();
    (!step.is_empty()).then(|| step.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn value_of(select: &str) -> BindingNode {
        BindingNode::new("xsl:value-of").with_attribute("select", select)
    }

    fn conditional(test: &str, select: &str) -> BindingNode {
        BindingNode::new("xsl:choose").with_child(
            BindingNode::new("xsl:when")
                .with_attribute("test", test)
                .with_child(value_of(select)),
        )
    }

    fn input(record: BindingNode) -> BindingNode {
        BindingNode::new("pd:inputBindings").with_child(
            BindingNode::new("jdbcUpdateActivityInput").with_child(
                BindingNode::new("xsl:for-each")
                    .with_attribute("select", "$Start/root/row")
                    .with_child(record),
            ),
        )
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|&name| name.into()).collect()
    }

    #[test]
    fn test_declared_parameters() {
        let activity = BindingNode::new("pd:activity").with_child(
            BindingNode::new("config").with_child(
                BindingNode::new("Prepared_Param_DataType")
                    .with_child(
                        BindingNode::new("parameter")
                            .with_child(BindingNode::new("parameterName").with_text(" X "))
                            .with_child(BindingNode::new("dataType").with_text("VARCHAR")),
                    )
                    .with_child(
                        BindingNode::new("parameter")
                            .with_child(BindingNode::new("parameterName").with_text("Y")),
                    ),
            ),
        );
        assert_eq!(declared_parameters(&activity), Some(vec!["X".into(), "Y".into()]));
        assert_eq!(declared_parameters(&BindingNode::new("pd:activity")), None);
    }

    #[test]
    fn test_build_direct_and_conditional() {
        let record = BindingNode::new("Record")
            .with_child(BindingNode::new("X").with_child(value_of("$Start/root/row/FIELD1")))
            .with_child(
                BindingNode::new("Y").with_child(conditional("exists($Start/root/row/FIELD2)", "FIELD2")),
            );
        let binding = PlaceholderBinding::build(&names(&["X", "Y", "Z"]), Some(&input(record)));

        assert_eq!(binding.get("X"), Some(&ParameterBinding::Direct("FIELD1".into())));
        assert_eq!(binding.get("Y"), Some(&ParameterBinding::Conditional("FIELD2".into())));
        assert_eq!(binding.get("Z"), None);
        assert_eq!(binding.unbound().collect::<Vec<_>>(), ["Z"]);
    }

    #[test]
    fn test_direct_reference_wins_over_conditional() {
        let record = BindingNode::new("Record").with_child(
            BindingNode::new("X")
                .with_child(conditional("exists(OTHER)", "OTHER"))
                .with_child(value_of("DIRECT")),
        );
        let binding = PlaceholderBinding::build(&names(&["X"]), Some(&input(record)));
        assert_eq!(binding.get("X").map(ParameterBinding::field), Some("DIRECT"));
    }

    #[test]
    fn test_nested_value_of_is_last_resort() {
        let record = BindingNode::new("Record").with_child(
            BindingNode::new("X").with_child(conditional("string-length(A) > 0", "$row/A")),
        );
        let binding = PlaceholderBinding::build(&names(&["X"]), Some(&input(record)));
        assert_eq!(binding.get("X"), Some(&ParameterBinding::Direct("A".into())));
    }

    #[test]
    fn test_build_without_for_each_or_input() {
        let flat = BindingNode::new("pd:inputBindings").with_child(
            BindingNode::new("jdbcUpdateActivityInput")
                .with_child(BindingNode::new("X").with_child(value_of("F"))),
        );
        let binding = PlaceholderBinding::build(&names(&["X"]), Some(&flat));
        assert_eq!(binding.get("X").map(ParameterBinding::field), Some("F"));

        let binding = PlaceholderBinding::build(&names(&["X"]), None);
        assert_eq!(binding.declared(), ["X"]);
        assert_eq!(binding.get("X"), None);
    }

    #[test]
    fn test_tested_field() {
        assert_eq!(tested_field("exists($Start/a/B)").as_deref(), Some("B"));
        assert_eq!(tested_field("exists(B) and B != ''").as_deref(), Some("B"));
        assert_eq!(tested_field("string-length(B) > 0"), None);
        assert_eq!(tested_field("exists()"), None);
    }
}
