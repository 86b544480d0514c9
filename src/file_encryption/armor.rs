// Copyright 2020 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::KeyExportError;

pub(crate) const HEADER: &str = "-----BEGIN MEGOLM SESSION DATA-----";
pub(crate) const FOOTER: &str = "-----END MEGOLM SESSION DATA-----";

const LINE_WIDTH: usize = 76;

/// Wrap a binary envelope in PEM-style armor, base64-encoded and line-wrapped
/// at 76 characters, with a trailing newline after the footer.
pub(crate) fn wrap(binary: &[u8]) -> String {
    let encoded = base64::encode(binary);

    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 64);
    out.push_str(HEADER);
    out.push('\n');

    let bytes = encoded.as_bytes();
    for chunk in bytes.chunks(LINE_WIDTH) {
        // `encoded` is base64 (ASCII), so chunking bytes never splits a char.
        out.push_str(std::str::from_utf8(chunk).expect("base64 output is ASCII"));
        out.push('\n');
    }

    out.push_str(FOOTER);
    out.push('\n');
    out
}

/// Unwrap PEM-style armor back into the binary envelope it carries.
///
/// Lines are trimmed of surrounding whitespace (tolerating `\r\n`) and empty
/// lines are dropped before the structural header/footer checks run.
pub(crate) fn unwrap(bytes: &[u8]) -> Result<Vec<u8>, KeyExportError> {
    let text = std::str::from_utf8(bytes).map_err(|_| KeyExportError::MalformedArmor)?;

    let lines: Vec<&str> =
        text.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

    if lines.len() < 3 {
        // Need at least header, one body line, and footer.
        return Err(KeyExportError::MalformedArmor);
    }

    let (first, rest) = lines.split_first().expect("checked length above");
    let (last, body) = rest.split_last().expect("checked length above");

    if *first != HEADER || *last != FOOTER {
        return Err(KeyExportError::MalformedArmor);
    }

    let payload: String = body.concat();
    base64::decode(&payload).map_err(|_| KeyExportError::MalformedArmor)
}
