//! Type reconciliation between source and target dialects.
//!
//! - [`canonical`]: dialect-independent [`TypeFamily`] and the heuristic classifier
//! - [`typemap`]: [`TypeMapper`] with static, generated and built-in tables
//!
//! # Usage
//!
//! ```rust,ignore
//! let mapper = TypeMapper::for_pair("mssql", catalog.create("postgres")?).unwrap();
//! assert_eq!(mapper.map_type("datetime2").target_type, "timestamp");
//! ```

mod canonical;
mod typemap;

pub use canonical::{classify, split_type, TypeFamily};
pub use typemap::{
    default_type_table, parse_type_table, static_type_table, type_table_prompt, TableSource,
    TypeMapper, TypeMapping,
};
