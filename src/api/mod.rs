//! Typed request builders and parsers, one module per REST resource.
//!
//! Every function takes the [`HttpClient`](crate::http::HttpClient)
//! explicitly. Failures carry the server's `message` when it sent one,
//! else the resource's fallback text below.

pub mod auth;
pub mod ramps;
pub mod uploads;
pub mod users;

pub const MSG_SIGN_UP_FAILED: &str = "회원가입에 실패했습니다.";
pub const MSG_SIGN_IN_FAILED: &str = "로그인에 실패했습니다.";
pub const MSG_CREATE_FAILED: &str = "경사로 생성에 실패했습니다";
pub const MSG_DELETE_FAILED: &str = "삭제에 실패했습니다";
pub const MSG_LIST_FAILED: &str = "경사로 목록을 불러오지 못했습니다";
pub const MSG_PRESIGN_FAILED: &str = "업로드용 presigned URL을 가져오지 못했습니다.";
pub const MSG_PUT_FAILED: &str = "파일 업로드에 실패했습니다.";
pub const MSG_EXCEL_FAILED: &str = "엑셀 업로드 실패";
