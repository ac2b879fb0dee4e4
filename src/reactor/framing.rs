use bytes::*;

/// How a byte stream is cut into frames.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Terminator {
    /// Every frame is exactly this many bytes.
    Length(usize),
    /// Frames end with this byte sequence, which is not part of the frame.
    Delimiter(Bytes),
}

/// Accumulates received bytes and hands them out frame by frame. Without a
/// terminator everything buffered so far is one frame.
#[derive(Debug, Default)]
pub struct Framer {
    buf: BytesMut,
    terminator: Option<Terminator>,
}

impl Framer {
    pub fn new(terminator: Option<Terminator>) -> Self {
        Framer {
            buf: BytesMut::new(),
            terminator,
        }
    }

    pub fn set_terminator(&mut self, terminator: Option<Terminator>) {
        self.terminator = terminator;
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn next_frame(&mut self) -> Option<Bytes> {
        match &self.terminator {
            Some(Terminator::Length(len)) if *len > 0 => {
                if self.buf.len() < *len {
                    return None;
                }
                Some(self.buf.split_to(*len).freeze())
            }
            Some(Terminator::Delimiter(delimiter)) if !delimiter.is_empty() => loop {
                let pos = self
                    .buf
                    .windows(delimiter.len())
                    .position(|window| window == &delimiter[..])?;
                let frame = self.buf.split_to(pos).freeze();
                self.buf.advance(delimiter.len());
                // back-to-back delimiters yield nothing
                if !frame.is_empty() {
                    return Some(frame);
                }
            },
            _ => {
                if self.buf.is_empty() {
                    return None;
                }
                Some(self.buf.split().freeze())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(framer: &mut Framer) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = framer.next_frame() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    pub fn delimiter_in_one_chunk() {
        let mut framer = Framer::new(Some(Terminator::Delimiter(Bytes::from_static(b"\r\n"))));
        framer.push(b"ab\r\ncd\r\n");
        assert_eq!(drain(&mut framer), vec![&b"ab"[..], &b"cd"[..]]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    pub fn delimiter_in_many_chunks() {
        let mut framer = Framer::new(Some(Terminator::Delimiter(Bytes::from_static(b"\r\n"))));
        let mut frames = Vec::new();
        for chunk in [&b"a"[..], &b"b\r"[..], &b"\nc"[..], &b"d\r\n"[..]] {
            framer.push(chunk);
            frames.extend(drain(&mut framer));
        }
        assert_eq!(frames, vec![&b"ab"[..], &b"cd"[..]]);
    }

    #[test]
    pub fn empty_frames_suppressed() {
        let mut framer = Framer::new(Some(Terminator::Delimiter(Bytes::from_static(b"\r\n"))));
        framer.push(b"\r\n\r\nab\r\n\r\n");
        assert_eq!(drain(&mut framer), vec![&b"ab"[..]]);
    }

    #[test]
    pub fn fixed_length() {
        let mut framer = Framer::new(Some(Terminator::Length(4)));
        framer.push(b"abcdefgh");
        assert_eq!(drain(&mut framer), vec![&b"abcd"[..], &b"efgh"[..]]);

        framer.push(b"ij");
        assert!(framer.next_frame().is_none());
        assert_eq!(framer.buffered(), 2);
    }

    #[test]
    pub fn no_terminator() {
        let mut framer = Framer::default();
        assert!(framer.next_frame().is_none());
        framer.push(b"abc");
        framer.push(b"def");
        assert_eq!(drain(&mut framer), vec![&b"abcdef"[..]]);
    }
}
