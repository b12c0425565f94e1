// {{{ Copyright (c) Paul R. Tagliamonte <paultag@debian.org>, 2024
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE. }}}

//! Low-level RFC-822-style block parsing, shared by the `status` file reader
//! and the control-file reader. Never touches the filesystem.

/// Minimally processed key/value pair from a Debian RFC2822-like file.
///
/// In general, using this directly is a bad idea -- see [RawParagraph].
#[derive(Clone, Debug, PartialEq)]
pub struct RawField {
    /// Key name for the field, e.g. `Package`.
    pub key: String,

    /// Value of the field. Continuation lines are joined with `\n`, with
    /// their leading whitespace preserved (callers strip it for
    /// single-line fields, but `Description` needs it intact).
    pub value: String,
}

/// All the raw, unprocessed [RawField] values from one paragraph (one
/// package record), in the order they were seen.
///
/// It is possible to construct an invalid [RawParagraph]; turning one into a
/// concrete [crate::control::Package] is where real validation happens.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawParagraph {
    /// Fields, in file order.
    pub fields: Vec<RawField>,
}

/// Error conditions encountered parsing a stream of paragraphs.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A continuation line (leading whitespace) appeared before any field.
    ContinuationWithoutField {
        /// Line number within the paragraph (0-indexed).
        line: usize,
    },

    /// A line had no `:` separating key and value, and wasn't a
    /// continuation line or a comment.
    MalformedLine {
        /// Line number within the paragraph (0-indexed).
        line: usize,
    },

    /// The same field name appeared twice in one paragraph.
    DuplicateField {
        /// The repeated field name.
        key: String,
    },
}
crate::errors::error_enum!(Error);

impl RawParagraph {
    /// Parse one paragraph already split out from its neighbours (no blank
    /// lines inside `lines`).
    fn parse<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Self, Error> {
        let mut fields: Vec<RawField> = vec![];

        for (line_no, line) in lines.enumerate() {
            if line.starts_with('#') {
                continue;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                let Some(field) = fields.last_mut() else {
                    return Err(Error::ContinuationWithoutField { line: line_no });
                };
                field.value.push('\n');
                field.value.push_str(line);
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(Error::MalformedLine { line: line_no });
            };

            fields.push(RawField {
                key: key.trim().to_owned(),
                value: value.trim_start_matches(' ').to_owned(),
            });
        }

        Ok(RawParagraph { fields })
    }

    /// Split a stream of blank-line-separated paragraphs and parse each in
    /// turn. A malformed record is skipped, not fatal to the whole stream:
    /// the caller gets back both the parsed paragraphs and the errors for
    /// any records it had to drop.
    pub fn parse_stream(text: &str) -> (Vec<RawParagraph>, Vec<Error>) {
        let mut paragraphs = vec![];
        let mut errors = vec![];

        let mut block: Vec<&str> = vec![];
        for line in text.lines() {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    match RawParagraph::parse(block.drain(..)) {
                        Ok(p) => paragraphs.push(p),
                        Err(e) => errors.push(e),
                    }
                }
                continue;
            }
            block.push(line);
        }
        if !block.is_empty() {
            match RawParagraph::parse(block.drain(..)) {
                Ok(p) => paragraphs.push(p),
                Err(e) => errors.push(e),
            }
        }

        (paragraphs, errors)
    }

    /// Iterate over all key/value pairs, in file order.
    pub fn iter(&self) -> impl Iterator<Item = &RawField> {
        self.fields.iter()
    }

    /// Return the single field named `field_name`, or an error if it's
    /// duplicated: duplicate fields are malformed.
    pub fn field_once(&self, field_name: &str) -> Result<Option<&str>, Error> {
        let mut matches = self.fields.iter().filter(|f| f.key == field_name);
        let Some(first) = matches.next() else {
            return Ok(None);
        };
        if matches.next().is_some() {
            return Err(Error::DuplicateField {
                key: field_name.to_owned(),
            });
        }
        Ok(Some(first.value.as_str()))
    }
}


// vim: foldmethod=marker
