// Small slice of the 1.0.x string tables, enough to make drained output realistic.

pub mod codes {
    use crate::errqueue::ErrorCode;

    pub const LIB_PEM: u32 = 9;
    pub const LIB_ASN1: u32 = 13;
    pub const LIB_SSL: u32 = 20;

    pub const ASN1_CHECK_TLEN_WRONG_TAG: ErrorCode = ErrorCode::pack(LIB_ASN1, 104, 168);
    pub const ASN1_ITEM_EX_D2I_NESTED: ErrorCode = ErrorCode::pack(LIB_ASN1, 107, 58);
    pub const PEM_READ_BIO_NO_START_LINE: ErrorCode = ErrorCode::pack(LIB_PEM, 111, 108);
    pub const SSL_CTX_USE_CERT_FILE_SYSTEM_LIB: ErrorCode = ErrorCode::pack(LIB_SSL, 173, 2);
}

use codes::{LIB_ASN1, LIB_PEM, LIB_SSL};

const LIBRARIES: &[(u32, &str)] = &[
    (LIB_PEM, "PEM routines"),
    (LIB_ASN1, "asn1 encoding routines"),
    (LIB_SSL, "SSL routines"),
];

const FUNCTIONS: &[((u32, u32), &str)] = &[
    ((LIB_ASN1, 104), "ASN1_CHECK_TLEN"),
    ((LIB_ASN1, 107), "ASN1_ITEM_EX_D2I"),
    ((LIB_PEM, 111), "PEM_read_bio"),
    ((LIB_SSL, 173), "SSL_CTX_use_certificate_file"),
];

const REASONS: &[((u32, u32), &str)] = &[
    ((LIB_ASN1, 58), "nested asn1 error"),
    ((LIB_ASN1, 168), "wrong tag"),
    ((LIB_PEM, 108), "no start line"),
    ((LIB_SSL, 2), "system lib"),
];

pub(crate) fn library_name(lib: u32) -> Option<&'static str> {
    LIBRARIES.iter().find(|(l, _)| *l == lib).map(|(_, s)| *s)
}

pub(crate) fn function_name(lib: u32, func: u32) -> Option<&'static str> {
    FUNCTIONS.iter().find(|(k, _)| *k == (lib, func)).map(|(_, s)| *s)
}

pub(crate) fn reason_text(lib: u32, reason: u32) -> Option<&'static str> {
    REASONS.iter().find(|(k, _)| *k == (lib, reason)).map(|(_, s)| *s)
}
