pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

#[derive(Debug, Default)]
pub struct UuidIdGen;

impl IdGenerator for UuidIdGen {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic ids (`<prefix>-0`, `<prefix>-1`, ...) for tests and
/// reproducible command output.
#[derive(Debug)]
pub struct SequentialIdGen {
    prefix: String,
    next: u64,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("w")
    }
}

impl IdGenerator for SequentialIdGen {
    fn next_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        format!("{}-{id}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIdGen::new("split");
        assert_eq!(ids.next_id(), "split-0");
        assert_eq!(ids.next_id(), "split-1");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let mut ids = UuidIdGen;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
