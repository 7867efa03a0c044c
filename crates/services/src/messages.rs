//! User-facing texts for error codes. The request layer picks the locale;
//! anything unknown falls back to English, and unknown codes to a generic
//! message so internal detail never reaches the user.

use domains::{BoardError, MessageResolver};

#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    pub fn describe(&self, error: &BoardError, locale: &str) -> String {
        self.resolve(error.code(), locale)
    }
}

impl MessageResolver for Catalog {
    fn resolve(&self, code: &str, locale: &str) -> String {
        let korean = locale
            .split(['-', '_'])
            .next()
            .is_some_and(|lang| lang.eq_ignore_ascii_case("ko"));
        let (en, ko) = texts(code);
        let text = if korean { ko } else { en };
        text.to_string()
    }
}

fn texts(code: &str) -> (&'static str, &'static str) {
    match code {
        "memorial.not_found" => ("The memorial does not exist.", "존재하지 않는 추모관입니다."),
        "memorial.already_deleted" => ("The memorial has been deleted.", "삭제된 추모관입니다."),
        "memorial.ownership_mismatch" => (
            "The memorial does not match the request.",
            "요청과 일치하지 않는 추모관입니다.",
        ),
        "comment.not_found" => ("The comment does not exist.", "존재하지 않는 댓글입니다."),
        "comment.already_deleted" => ("The comment has been deleted.", "이미 삭제된 댓글입니다."),
        "comment.ownership_mismatch" => (
            "The comment does not belong to this memorial.",
            "해당 추모관의 댓글이 아닙니다.",
        ),
        "reply.not_found" => ("The reply does not exist.", "존재하지 않는 답글입니다."),
        "reply.already_deleted" => ("The reply has been deleted.", "이미 삭제된 답글입니다."),
        "reply.ownership_mismatch" => (
            "The reply does not belong to the requested comment or memorial.",
            "요청한 댓글 또는 추모관의 답글이 아닙니다.",
        ),
        "auth.passcode_mismatch" => ("The passcode does not match.", "비밀번호가 일치하지 않습니다."),
        "validation.invalid_id" => ("The identifier is invalid.", "잘못된 식별자입니다."),
        "validation.blank" => ("A required field is empty.", "필수 항목이 비어 있습니다."),
        "validation.too_long" => ("A field is too long.", "입력 값이 너무 깁니다."),
        "validation.passcode_length" => (
            "The passcode length is not allowed.",
            "비밀번호 길이가 올바르지 않습니다.",
        ),
        "validation.unknown_emotion" => ("Unknown emotion.", "알 수 없는 감정입니다."),
        "validation.page_size" => ("The page size is out of range.", "페이지 크기가 범위를 벗어났습니다."),
        "validation.invalid_cursor" => ("The page cursor is invalid.", "잘못된 페이지 커서입니다."),
        "lock.timeout" => (
            "The memorial is busy. Please try again.",
            "요청이 많습니다. 잠시 후 다시 시도해 주세요.",
        ),
        _ => ("Something went wrong.", "일시적인 오류가 발생했습니다."),
    }
}
