/// Result of a read that distinguishes an absent key from a present value
///
/// A stored `None` is still [`Lookup::Present`] when read as an `Option<T>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Present(T),
    Absent,
}

impl<T> Lookup<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Present(value) => Some(value),
            Lookup::Absent => None,
        }
    }

    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Lookup::Present(value) => Lookup::Present(value),
            Lookup::Absent => Lookup::Absent,
        }
    }

    /// Returns the value, or `default` when absent
    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Present(value),
            None => Lookup::Absent,
        }
    }
}

impl<T> From<Lookup<T>> for Option<T> {
    fn from(lookup: Lookup<T>) -> Self {
        lookup.into_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_none_is_not_absent() {
        let stored_none: Lookup<Option<i32>> = Lookup::from(Some(None));
        assert!(stored_none.is_present());
        assert_eq!(stored_none.into_option(), Some(None));

        let missing: Lookup<Option<i32>> = Lookup::from(None);
        assert!(missing.is_absent());
    }

    #[test]
    fn test_unwrap_or() {
        assert_eq!(Lookup::Present(3).unwrap_or(7), 3);
        assert_eq!(Lookup::Absent.unwrap_or(7), 7);
    }
}
