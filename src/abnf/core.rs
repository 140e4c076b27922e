//! The RFC 5234 appendix B.1 core rules, available as first-class rules.
use super::ast::{Rule, Rulelist, Rulename};
use super::parser::Parse;

const CORE_ABNF: &str = "ALPHA = %x41-5A / %x61-7A\r\n\
BIT = \"0\" / \"1\"\r\n\
CHAR = %x1-7F\r\n\
CR = %xD\r\n\
CRLF = CR LF\r\n\
CTL = %x0-1F / %x7F\r\n\
DIGIT = %x30-39\r\n\
DQUOTE = %x22\r\n\
HEXDIG = DIGIT / \"A\" / \"B\" / \"C\" / \"D\" / \"E\" / \"F\"\r\n\
HTAB = %x9\r\n\
LF = %xA\r\n\
LWSP = *(WSP / CRLF WSP)\r\n\
OCTET = %x0-FF\r\n\
SP = %x20\r\n\
VCHAR = %x21-7E\r\n\
WSP = SP / HTAB\r\n";

/// The sixteen core rules.
pub fn core_rules() -> Rulelist {
	Rulelist::parse(CORE_ABNF).unwrap()
}

/// A single core rule, looked up case-insensitively.
pub fn core_rule(name: &Rulename) -> Option<Rule> {
	core_rules().get(name)
}
