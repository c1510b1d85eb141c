use std::borrow::Cow;

use crate::crs::{Srid, CRS84_URI};

/// Rewrite a CRS-prefixed literal into its canonical form.
///
/// A `<.../<code>>` URI prefix becomes `SRID=<code>;`. The CRS84 prefix is dropped entirely,
/// since CRS84 is already longitude first. Anything else, including literals already in the
/// `SRID=<n>;` form and bare WKT, is returned unchanged.
pub fn normalize(literal: &str) -> Cow<'_, str> {
    let Some((uri, body)) = literal
        .strip_prefix('<')
        .and_then(|rest| rest.split_once('>'))
    else {
        return Cow::Borrowed(literal);
    };
    let body = body.trim();

    if uri == CRS84_URI {
        return Cow::Borrowed(body);
    }

    match uri.rsplit_once('/') {
        Some((_, code)) if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) => {
            Cow::Owned(format!("SRID={code};{body}"))
        }
        _ => Cow::Borrowed(literal),
    }
}

/// Split a leading `SRID=<n>;` off a literal.
///
/// A prefix whose code is not a valid integer is left in place, so that the WKT parser
/// rejects the literal as a whole.
pub fn split_srid(text: &str) -> (Option<Srid>, &str) {
    let split = text
        .strip_prefix("SRID=")
        .and_then(|rest| rest.split_once(';'))
        .and_then(|(code, body)| Some((code.trim().parse::<u32>().ok()?, body)));
    match split {
        Some((code, body)) => (Some(Srid(code)), body.trim_start()),
        None => (None, text),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bare_wkt_is_unchanged() {
        for wkt in [
            "POINT(4.5 50.5)",
            "LINESTRING(0 0, 1 1)",
            "  POLYGON((0 0, 1 0, 1 1, 0 0))",
            "MULTIPOINT((1 2),(3 4))",
        ] {
            assert!(matches!(normalize(wkt), Cow::Borrowed(s) if s == wkt));
        }
    }

    #[test]
    fn srid_prefix_is_unchanged() {
        let literal = "SRID=31370;POINT(150000 500000)";
        assert_eq!(normalize(literal), literal);
    }

    #[test]
    fn epsg_uri_becomes_srid_prefix() {
        assert_eq!(
            normalize("<http://www.opengis.net/def/crs/EPSG/0/31370> POINT(150000 500000)"),
            "SRID=31370;POINT(150000 500000)"
        );
        assert_eq!(
            normalize("<http://www.opengis.net/def/crs/EPSG/0/4326>\n  POINT(50.5 4.5)  "),
            "SRID=4326;POINT(50.5 4.5)"
        );
    }

    #[test]
    fn any_uri_with_trailing_code() {
        assert_eq!(
            normalize("<https://crs.example.org/def/3035> POINT(4321000 3210000)"),
            "SRID=3035;POINT(4321000 3210000)"
        );
    }

    #[test]
    fn crs84_prefix_is_stripped() {
        assert_eq!(
            normalize("<http://www.opengis.net/def/crs/OGC/1.3/CRS84> POINT(4.5 50.5)"),
            "POINT(4.5 50.5)"
        );
    }

    #[test]
    fn unrecognized_uri_is_unchanged() {
        let literal = "<http://www.opengis.net/def/crs/OGC/1.3/CRS83> POINT(1 2)";
        assert_eq!(normalize(literal), literal);
        let unterminated = "<http://www.opengis.net/def/crs/EPSG/0/4326 POINT(1 2)";
        assert_eq!(normalize(unterminated), unterminated);
    }

    #[test]
    fn split_prefix() {
        assert_eq!(
            split_srid("SRID=31370;POINT(1 2)"),
            (Some(Srid(31370)), "POINT(1 2)")
        );
        assert_eq!(split_srid("POINT(1 2)"), (None, "POINT(1 2)"));
        assert_eq!(
            split_srid("SRID=abc;POINT(1 2)"),
            (None, "SRID=abc;POINT(1 2)")
        );
        assert_eq!(split_srid("SRID=4326"), (None, "SRID=4326"));
    }
}
