//! Splitting document text into independently matchable blocks.

use regex::Regex;

use super::compile_pattern;
use super::transaction::BlockParser;
use crate::error::ConfigurationError;

/// A contiguous run of lines handed to one transaction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan<'t> {
    /// Zero-based index of the first line.
    pub start_line: usize,
    /// Zero-based index of the last line (inclusive).
    pub end_line: usize,
    /// Byte offset of the block in the document.
    pub start_offset: usize,
    /// Byte offset just past the last line, excluding its line terminator.
    pub end_offset: usize,
    /// The block's text.
    pub text: &'t str,
    /// Line cap the splitter applied, if any.
    pub max_lines: Option<usize>,
}

impl BlockSpan<'_> {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Boundary patterns and size cap that define where blocks start and end.
#[derive(Debug, Clone)]
pub struct BlockSplitter {
    start: Regex,
    end: Option<Regex>,
    max_size: Option<usize>,
}

impl BlockSplitter {
    /// Blocks begin at every line matching `start`.
    pub fn new(start: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            start: compile_pattern(start)?,
            end: None,
            max_size: None,
        })
    }

    /// Close a block at the first following line matching `end` (inclusive).
    pub fn with_end(mut self, end: &str) -> Result<Self, ConfigurationError> {
        self.end = Some(compile_pattern(end)?);
        Ok(self)
    }

    /// Cap blocks at `max_size` lines; `1` makes every block its start line.
    pub fn with_max_size(mut self, max_size: usize) -> Result<Self, ConfigurationError> {
        if max_size == 0 {
            return Err(ConfigurationError::InvalidMaxSize);
        }
        self.max_size = Some(max_size);
        Ok(self)
    }

    /// Lazily split `text`. Calling again restarts from the top.
    pub fn split<'s, 't>(&'s self, text: &'t str) -> Blocks<'s, 't> {
        Blocks {
            splitter: self,
            text,
            lines: LineSpans::new(text),
            pending: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Line<'t> {
    index: usize,
    start: usize,
    end: usize,
    text: &'t str,
}

#[derive(Debug, Clone)]
struct LineSpans<'t> {
    text: &'t str,
    offset: usize,
    index: usize,
}

impl<'t> LineSpans<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, offset: 0, index: 0 }
    }
}

impl<'t> Iterator for LineSpans<'t> {
    type Item = Line<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.text.len() {
            return None;
        }

        let rest = &self.text[self.offset..];
        let (len, advance) = match rest.find('\n') {
            Some(i) => (i, i + 1),
            None => (rest.len(), rest.len()),
        };
        let text = rest[..len].strip_suffix('\r').unwrap_or(&rest[..len]);

        let line = Line {
            index: self.index,
            start: self.offset,
            end: self.offset + text.len(),
            text,
        };

        self.offset += advance;
        self.index += 1;
        Some(line)
    }
}

/// Iterator over the blocks of one document, in document order.
#[derive(Debug, Clone)]
pub struct Blocks<'s, 't> {
    splitter: &'s BlockSplitter,
    text: &'t str,
    lines: LineSpans<'t>,
    // Start line of the next block, read while closing the previous one.
    pending: Option<Line<'t>>,
}

impl<'t> Iterator for Blocks<'_, 't> {
    type Item = BlockSpan<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let splitter = self.splitter;

        let first = loop {
            let line = self.pending.take().or_else(|| self.lines.next())?;
            if splitter.start.is_match(line.text) {
                break line;
            }
        };

        let mut last = first;
        let mut count = 1;

        while splitter.max_size.is_none_or(|max| count < max) {
            let Some(line) = self.lines.next() else {
                break;
            };
            if splitter.start.is_match(line.text) {
                self.pending = Some(line);
                break;
            }
            last = line;
            count += 1;
            if splitter.end.as_ref().is_some_and(|end| end.is_match(line.text)) {
                break;
            }
        }

        Some(BlockSpan {
            start_line: first.index,
            end_line: last.index,
            start_offset: first.start,
            end_offset: last.end,
            text: &self.text[first.start..last.end],
            max_lines: splitter.max_size,
        })
    }
}

/// A splitter bound to the parser that consumes its blocks.
pub struct Block {
    splitter: BlockSplitter,
    parser: Box<dyn BlockParser>,
}

impl Block {
    /// Start declaring a block whose spans begin at lines matching `start`.
    pub fn builder(start: impl Into<String>) -> BlockBuilder {
        BlockBuilder {
            start: start.into(),
            end: None,
            max_size: None,
            parser: None,
        }
    }

    pub fn splitter(&self) -> &BlockSplitter {
        &self.splitter
    }

    pub fn parser(&self) -> &dyn BlockParser {
        self.parser.as_ref()
    }
}

/// Builder for [`Block`].
pub struct BlockBuilder {
    start: String,
    end: Option<String>,
    max_size: Option<usize>,
    parser: Option<Box<dyn BlockParser>>,
}

impl BlockBuilder {
    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Parser for every span, typically a [`Transaction`](super::Transaction).
    pub fn transaction<P: BlockParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn build(self) -> Result<Block, ConfigurationError> {
        let parser = self
            .parser
            .ok_or_else(|| ConfigurationError::MissingTransaction(self.start.clone()))?;

        let mut splitter = BlockSplitter::new(&self.start)?;
        if let Some(end) = &self.end {
            splitter = splitter.with_end(end)?;
        }
        if let Some(max_size) = self.max_size {
            splitter = splitter.with_max_size(max_size)?;
        }

        Ok(Block { splitter, parser })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STATEMENT: &str = "Summary\n\
        06.02.2022 Go & Grow Zinsen 0,22 € 1.228,18 €\n\
        carried over\n\
        07.02.2022 Überweisen 1.000 € 2.228,18 €\n\
        footer";

    fn texts<'t>(blocks: impl Iterator<Item = BlockSpan<'t>>) -> Vec<&'t str> {
        blocks.map(|b| b.text).collect()
    }

    #[test]
    fn test_blocks_run_until_next_start() {
        let splitter = BlockSplitter::new(r"^\d{2}\.\d{2}\.\d{4} .*$").unwrap();
        assert_eq!(
            texts(splitter.split(STATEMENT)),
            vec![
                "06.02.2022 Go & Grow Zinsen 0,22 € 1.228,18 €\ncarried over",
                "07.02.2022 Überweisen 1.000 € 2.228,18 €\nfooter",
            ]
        );
    }

    #[test]
    fn test_max_size_one_yields_single_lines() {
        let splitter = BlockSplitter::new(r"^\d{2}\.\d{2}\.\d{4} .*$")
            .unwrap()
            .with_max_size(1)
            .unwrap();

        let blocks: Vec<_> = splitter.split(STATEMENT).collect();
        assert_eq!(blocks.len(), 2);
        for block in &blocks {
            assert_eq!(block.line_count(), 1);
            assert!(!block.text.contains('\n'));
            assert!(splitter.start.is_match(block.text));
            assert_eq!(&STATEMENT[block.start_offset..block.end_offset], block.text);
        }
        assert_eq!((blocks[0].start_line, blocks[1].start_line), (1, 3));
    }

    #[test]
    fn test_end_pattern_closes_block() {
        let text = "BEGIN a\nx\nEND\ntrailing\nBEGIN b\nEND";
        let splitter = BlockSplitter::new(r"^BEGIN").unwrap().with_end(r"^END$").unwrap();
        assert_eq!(texts(splitter.split(text)), vec!["BEGIN a\nx\nEND", "BEGIN b\nEND"]);
    }

    #[test]
    fn test_no_boundary_yields_nothing() {
        let splitter = BlockSplitter::new(r"^\d{4}-\d{2}-\d{2}").unwrap();
        assert_eq!(splitter.split(STATEMENT).count(), 0);
        assert_eq!(splitter.split("").count(), 0);
    }

    #[test]
    fn test_split_is_restartable() {
        let splitter = BlockSplitter::new(r"^\d{2}\.").unwrap();
        let mut blocks = splitter.split(STATEMENT);
        let first = blocks.next().unwrap();
        let replay = blocks.clone().count();
        assert_eq!(replay, 1);
        assert_eq!(splitter.split(STATEMENT).next(), Some(first));
    }

    #[test]
    fn test_crlf_lines() {
        let splitter = BlockSplitter::new(r"^row$").unwrap().with_max_size(1).unwrap();
        assert_eq!(texts(splitter.split("row\r\nrow\r\n")), vec!["row", "row"]);
    }

    #[test]
    fn test_zero_max_size_is_rejected() {
        let err = BlockSplitter::new(r"^x").unwrap().with_max_size(0).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidMaxSize));
    }
}
