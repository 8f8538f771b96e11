// Backslash escapes shared by .BYT, .STR and character literal operands
pub fn unescape(c: char) -> Option<char> {
    match c {
        't'  => Some('\t'),
        '\\' => Some('\\'),
        'n'  => Some('\n'),
        '\'' => Some('\''),
        '"'  => Some('"'),
        'r'  => Some('\r'),
        'b'  => Some('\u{8}'),
        _    => None,
    }
}
