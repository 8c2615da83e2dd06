use std::io::Read;

use crate::error::{Error, Result};

/// Standard input as a single-use resource.
///
/// The first reader takes the whole stream; any later attempt fails instead
/// of silently returning an empty buffer.
pub struct Stdin<R> {
    reader: R,
    consumed: bool,
}

impl<R: Read> Stdin<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            consumed: false,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Reads the entire stream. `owner` names the consumer for error messages.
    pub fn read_all(&mut self, owner: &str) -> Result<Vec<u8>> {
        if self.consumed {
            return Err(Error::usage(format!(
                "standard input has already been consumed; it cannot also be used by {owner}"
            )));
        }
        self.consumed = true;

        let mut buf = Vec::new();
        self.reader
            .read_to_end(&mut buf)
            .map_err(|e| Error::io(format!("failed to read stdin for {owner}"), e))?;
        log::debug!("read {} byte(s) from stdin for {}", buf.len(), owner);
        Ok(buf)
    }

    pub fn read_to_string(&mut self, owner: &str) -> Result<String> {
        let bytes = self.read_all(owner)?;
        String::from_utf8(bytes)
            .map_err(|_| Error::Invalid(format!("stdin content for {owner} is not valid UTF-8")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_read_takes_everything() {
        let mut stdin = Stdin::new("Hello, World!".as_bytes());
        assert!(!stdin.is_consumed());
        assert_eq!(stdin.read_all("body").unwrap(), b"Hello, World!");
        assert!(stdin.is_consumed());
    }

    #[test]
    fn test_second_read_is_usage_error() {
        let mut stdin = Stdin::new("data".as_bytes());
        stdin.read_all("'a'").unwrap();
        let err = stdin.read_all("'b'").unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_non_utf8_string_is_rejected() {
        let mut stdin = Stdin::new(&[0xffu8, 0xfe][..]);
        assert!(stdin.read_to_string("'x'").is_err());
    }
}
