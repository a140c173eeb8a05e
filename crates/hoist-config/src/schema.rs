use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::HoistConfig;

/// JSON schema for `hoist.toml`, for editor and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(HoistConfig)
}
