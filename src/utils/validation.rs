use crate::error::{Error, Result};

/// Turns a list of human readable problems into a 400.
pub fn reject_if_any(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::BadRequest(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problems_are_joined_into_one_message() {
        assert!(reject_if_any(vec![]).is_ok());
        let err = reject_if_any(vec!["a".into(), "b".into()]).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: a; b");
    }
}
