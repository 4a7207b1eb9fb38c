/// One row of the operator route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    pub value: String,
    pub gateway_id: String,
    pub active: bool,
}

impl Prefix {
    pub fn new(value: impl Into<String>, gateway_id: impl Into<String>, active: bool) -> Self {
        Self {
            value: value.into(),
            gateway_id: gateway_id.into(),
            active,
        }
    }

    pub fn active(value: impl Into<String>, gateway_id: impl Into<String>) -> Self {
        Self::new(value, gateway_id, true)
    }
}
