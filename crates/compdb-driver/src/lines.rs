//! Joining of backslash-continued physical lines.

/// One logical line of the build log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line.
    pub number: usize,
    /// The joined text, trailing whitespace removed.
    pub text: String,
}

/// Iterator over logical lines.
///
/// A physical line ending in `\` is joined with the next one, the backslash
/// removed. A trailing backslash on the last line is dropped.
pub struct LogicalLines<I> {
    lines: I,
    number: usize,
}

impl<I, S> LogicalLines<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: lines.into_iter(),
            number: 0,
        }
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

impl<I, S> Iterator for LogicalLines<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        let first = self.lines.next()?;
        self.number += 1;
        let number = self.number;

        let mut text = strip_line_ending(first.as_ref()).to_string();
        while let Some(joined) = text.strip_suffix('\\').map(str::len) {
            text.truncate(joined);
            match self.lines.next() {
                Some(next) => {
                    self.number += 1;
                    text.push_str(strip_line_ending(next.as_ref()));
                }
                None => break,
            }
        }

        text.truncate(text.trim_end().len());
        Some(LogicalLine { number, text })
    }
}
