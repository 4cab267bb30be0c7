use std::io::{self, Write};

/// Asks `message (y/n)` on stdin, returns true for "y"/"yes" (case-insensitive).
pub fn yes(message: &str) -> anyhow::Result<bool> {
    print!("{message} (y/n) ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Reads a field value, from a non-echoing TTY prompt if `secret` is set.
pub fn read_value(field: &str, secret: bool) -> anyhow::Result<String> {
    if secret {
        Ok(rpassword::prompt_password(format!("Set {field} value: "))?)
    } else {
        print!("Set {field} value: ");
        io::stdout().flush()?;
        let mut value = String::new();
        io::stdin().read_line(&mut value)?;
        Ok(value.trim_end_matches(['\n', '\r']).to_string())
    }
}
