use crate::errqueue::{CodeParts, ErrorCode};

/*
    Pull-based view of a native per-thread error queue.
      - `pop_error` removes the oldest code, returning `ErrorCode::NONE` once empty.
      - The string lookups return owned copies, or None when the library has
        no text for the code (for example before its tables are loaded).
      - Only meaningful on the thread that made the failing call.
*/
pub trait ErrorQueue {
    fn pop_error(&self) -> ErrorCode;

    fn library_string(&self, code: ErrorCode) -> Option<String>;
    fn function_string(&self, code: ErrorCode) -> Option<String>;
    fn reason_string(&self, code: ErrorCode) -> Option<String>;

    fn unpack(&self, code: ErrorCode) -> CodeParts {
        CodeParts::from_v1(code)
    }
}
