use std::io::{BufRead, Write};

use crate::core::engine::DutyEngine;

const BANNER: &str = "=== HTS Duty Calculator ===";
const PROMPT: &str =
    "Enter full duty query (include HTS code, cost, freight, insurance, weight, qty), or 'exit':\n> ";

/// Line-oriented session: every non-empty line is answered with `calculate_from_query`.
/// Ends on `exit`/`quit` or end of input. Returns the number of queries answered.
pub fn run_session<R: BufRead, W: Write>(engine: &DutyEngine, input: R, mut output: W) -> std::io::Result<usize> {
    writeln!(output, "\n{}", BANNER)?;
    let mut answered = 0usize;
    let mut lines = input.lines();

    loop {
        write!(output, "\n{}", PROMPT)?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        let result = engine.calculate_from_query(query);
        writeln!(output, "\n{}", result)?;
        answered += 1;
    }

    writeln!(output, "Exiting. Goodbye!")?;
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tariff_table::TariffTable;
    use crate::domain::model::TariffRecord;
    use std::io::Cursor;

    fn engine() -> DutyEngine {
        DutyEngine::from(TariffTable::from_records(vec![TariffRecord::new(
            "0101.30.00.00",
            "2%",
        )]))
    }

    #[test]
    fn test_session_answers_until_exit() {
        let input = Cursor::new(
            "HTS code 0101.30.00.00 cost $10,000 freight $500 insurance $100\n\nHTS code 1 cost 5\nexit\nHTS code 0101.30.00.00 cost 1\n",
        );
        let mut output = Vec::new();

        let answered = run_session(&engine(), input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert_eq!(answered, 2);
        assert!(text.contains("$212.00"));
        assert!(text.contains("❗️ HTS code 1 not found."));
        assert!(text.trim_end().ends_with("Exiting. Goodbye!"));
    }

    #[test]
    fn test_session_ends_at_eof() {
        let mut output = Vec::new();
        let answered = run_session(&engine(), Cursor::new(""), &mut output).unwrap();
        assert_eq!(answered, 0);
    }
}
