use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};

/// Shared prompt loop over any line-oriented input source. Production code
/// drives it from stdin; tests feed it a `Cursor`.
pub struct Prompter<R> {
    input: R,
}

impl<R: BufRead> Prompter<R> {
    pub fn new(input: R) -> Self {
        Prompter { input }
    }

    fn ask(&mut self, label: &str, default_hint: Option<&str>) -> Result<String> {
        match default_hint {
            Some(hint) => print!("{} [{}]: ", label, hint),
            None => print!("{}: ", label),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            bail!("Input stream closed before the prompts completed");
        }
        Ok(line.trim().to_string())
    }

    /// Raw line with no default handling; may be empty.
    pub fn line(&mut self, label: &str) -> Result<String> {
        self.ask(label, None)
    }

    /// Required value: loops until the user enters something, unless a
    /// non-empty default exists to fall back on.
    pub fn text(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let default = default.filter(|d| !d.is_empty());
        loop {
            let value = self.ask(label, default)?;
            if !value.is_empty() {
                return Ok(value);
            }
            if let Some(d) = default {
                return Ok(d.to_string());
            }
            println!("  Value required.");
        }
    }

    /// Optional value: blank falls back to the default, which may be absent.
    pub fn optional(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        let default = default.filter(|d| !d.is_empty());
        let value = self.ask(label, default)?;
        if value.is_empty() {
            return Ok(default.map(str::to_string));
        }
        Ok(Some(value))
    }

    pub fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let value = self.ask(label, Some(hint))?.to_lowercase();
            match value.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("  Please answer yes or no."),
            }
        }
    }

    /// Port number: blank takes the default, anything non-numeric re-prompts.
    pub fn port(&mut self, label: &str, default: u16) -> Result<u16> {
        let hint = default.to_string();
        loop {
            let value = self.ask(label, Some(&hint))?;
            if value.is_empty() {
                return Ok(default);
            }
            match value.parse::<u16>() {
                Ok(port) => return Ok(port),
                Err(_) => println!("  Enter a valid integer."),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()))
    }

    #[test]
    fn text_blank_takes_default() {
        let mut p = prompter("\n");
        assert_eq!(p.text("Host", Some("192.168.1.50")).unwrap(), "192.168.1.50");
    }

    #[test]
    fn text_without_default_loops_until_nonempty() {
        let mut p = prompter("\n\nmedia-pool\n");
        assert_eq!(p.text("Volume name", None).unwrap(), "media-pool");
    }

    #[test]
    fn text_input_overrides_default() {
        let mut p = prompter("10.0.0.9\n");
        assert_eq!(p.text("Host", Some("192.168.1.50")).unwrap(), "10.0.0.9");
    }

    #[test]
    fn optional_blank_without_default_is_none() {
        let mut p = prompter("\n");
        assert_eq!(p.optional("Owner", None).unwrap(), None);
    }

    #[test]
    fn optional_blank_keeps_default() {
        let mut p = prompter("\n");
        assert_eq!(p.optional("Owner", Some("1000")).unwrap(), Some("1000".into()));
    }

    #[test]
    fn confirm_accepts_yes_no_and_loops_otherwise() {
        let mut p = prompter("maybe\nYES\n");
        assert!(p.confirm("Keep?", false).unwrap());

        let mut p = prompter("n\n");
        assert!(!p.confirm("Keep?", true).unwrap());

        let mut p = prompter("\n");
        assert!(p.confirm("Keep?", true).unwrap());
    }

    #[test]
    fn port_rejects_non_numeric_then_accepts() {
        let mut p = prompter("twenty-two\n2222\n");
        assert_eq!(p.port("SSH port", 22).unwrap(), 2222);

        let mut p = prompter("\n");
        assert_eq!(p.port("SSH port", 22).unwrap(), 22);
    }

    #[test]
    fn eof_is_an_error() {
        let mut p = prompter("");
        assert!(p.text("Host", Some("x")).is_err());
    }
}
