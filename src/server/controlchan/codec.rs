use super::{command::Command, error::{ControlChanError, ControlChanErrorKind}, line_parser, Reply};

use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// Commands may not grow beyond this without a terminating newline.
const MAX_LINE_LEN: usize = 8 * 1024;

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control
// channel, that we'll use to decode FTP commands and encode their replies.
pub struct FtpCodec {
    // Stored index of the next index to examine for a '\n' character. This is
    // used to optimize searching. For example, if `decode` was called with
    // `abc`, it would hold `3`, because that is the next index to examine.
    // The next time `decode` is called with `abcde\n`, we will only look at
    // `de\n` before returning.
    next_index: usize,
}

impl FtpCodec {
    pub fn new() -> Self {
        FtpCodec { next_index: 0 }
    }
}

impl Decoder for FtpCodec {
    type Item = Command;
    type Error = ControlChanError;

    // Here we decode the incoming bytes into a meaningful command. We'll
    // split on newlines and parse the resulting line.
    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Command>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(line_parser::parse(&line[..])?))
        } else if buf.len() > MAX_LINE_LEN {
            Err(ControlChanError::new(ControlChanErrorKind::CommandLineTooLong))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    // Here we encode the outgoing reply.
    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        match reply {
            Reply::None => {
                return Ok(());
            }
            Reply::CodeAndMsg { code, msg } => {
                if msg.is_empty() {
                    writeln!(buffer, "{}\r", code as u32)?;
                } else {
                    writeln!(buffer, "{} {}\r", code as u32, msg)?;
                }
            }
            Reply::MultiLine { code, mut lines } => {
                // Get the last line since it needs to be preceded by the reply code.
                let last_line = lines.pop().unwrap_or_default();

                // Lines starting with a digit should be indented
                for it in lines.iter_mut() {
                    if it.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                        it.insert(0, ' ');
                    }
                }

                if lines.is_empty() {
                    writeln!(buffer, "{} {}\r", code as u32, last_line)?;
                } else {
                    write!(buffer, "{}-{}\r\n{} {}\r\n", code as u32, lines.join("\r\n"), code as u32, last_line)?;
                }
            }
        }
        buf.extend(&buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controlchan::ReplyCode;
    use pretty_assertions::assert_eq;

    fn encoded(reply: Reply) -> String {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(reply, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn single_line_reply() {
        assert_eq!(encoded(Reply::new(ReplyCode::CommandOkay, "OK")), "200 OK\r\n");
    }

    #[test]
    fn multi_line_reply_uses_dash_bracketing() {
        let reply = Reply::new_multiline(ReplyCode::SystemStatus, vec!["Extensions supported:", " SIZE", "END"]);
        assert_eq!(encoded(reply), "211-Extensions supported:\r\n SIZE\r\n211 END\r\n");
    }

    #[test]
    fn none_reply_writes_nothing() {
        assert_eq!(encoded(Reply::none()), "");
    }

    #[test]
    fn decode_splits_lines_and_keeps_the_rest() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"NOOP\r\nQUI"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Command::Noop));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"T\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Command::Quit));
    }

    #[test]
    fn overlong_line_without_newline_errors() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(vec![b'a'; MAX_LINE_LEN + 1].as_slice());
        assert!(codec.decode(&mut buf).is_err());
    }
}
