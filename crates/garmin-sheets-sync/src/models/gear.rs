/// Footwear associated with an activity. Both fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GearRecord {
    pub name: String,
    pub id: String,
}

impl GearRecord {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emptiness() {
        assert!(GearRecord::default().is_empty());
        assert!(!GearRecord::new("", "42").is_empty());
        assert!(!GearRecord::new("Pegasus 40", "").is_empty());
    }
}
