//! Resolution of BW process statements into comparable SQL.
//!
//! A BW process stores each JDBC statement as a prepared statement with
//! positional `?` placeholders, a `Prepared_Param_DataType` block naming the
//! parameters in placeholder order, and an input mapping binding each
//! parameter to a field. This module walks an already-parsed
//! [`BindingNode`] tree and materializes a literal query in which every
//! placeholder is replaced by the name of the field feeding it, so it can
//! be compared with the legacy statement.
//!
//! ```
//! use sql_parity::{BindingNode, bw::resolve_activity};
//!
//! let activity = BindingNode::new("pd:activity")
//!     .with_child(BindingNode::new("pd:type").with_text("com.tibco.plugin.jdbc.JDBCUpdateActivity"))
//!     .with_child(
//!         BindingNode::new("config")
//!             .with_child(BindingNode::new("statement").with_text("INSERT INTO t (a) VALUES (?)"))
//!             .with_child(BindingNode::new("Prepared_Param_DataType").with_child(
//!                 BindingNode::new("parameter")
//!                     .with_child(BindingNode::new("parameterName").with_text("A")),
//!             )),
//!     )
//!     .with_child(BindingNode::new("pd:inputBindings").with_child(
//!         BindingNode::new("jdbcUpdateActivityInput").with_child(
//!             BindingNode::new("A").with_child(
//!                 BindingNode::new("xsl:value-of").with_attribute("select", "$Start/row/COL_A"),
//!             ),
//!         ),
//!     ));
//!
//! let resolution = resolve_activity(&activity).unwrap();
//! assert_eq!(resolution.query(), Some("INSERT INTO t (a) VALUES (:COL_A)"));
//! ```

mod binding;
mod resolver;
mod tree;

pub use binding::{ParameterBinding, PlaceholderBinding, declared_parameters};
pub use resolver::{
    Exclusion, Resolution, ResolvedStatement, count_placeholders, is_dual_probe, primary_query,
    resolve, resolve_activity, resolve_process, substitute_bindings, substitute_placeholders,
};
pub use tree::{BindingNode, Descendants};
