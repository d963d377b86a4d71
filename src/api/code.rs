/// Business result codes carried in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    Error,
    InvalidParams,
    ExistTag,
    NotExistTag,
    NotExistArticle,
    AuthCheckTokenFail,
    AuthCheckTokenTimeout,
    AuthToken,
}

impl ErrorCode {
    pub fn code(self) -> u32 {
        match self {
            ErrorCode::Success => 200,
            ErrorCode::Error => 500,
            ErrorCode::InvalidParams => 400,
            ErrorCode::ExistTag => 10001,
            ErrorCode::NotExistTag => 10002,
            ErrorCode::NotExistArticle => 10003,
            ErrorCode::AuthCheckTokenFail => 20001,
            ErrorCode::AuthCheckTokenTimeout => 20002,
            ErrorCode::AuthToken => 20003,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "ok",
            ErrorCode::Error => "fail",
            ErrorCode::InvalidParams => "invalid request parameters",
            ErrorCode::ExistTag => "tag name already exists",
            ErrorCode::NotExistTag => "tag does not exist",
            ErrorCode::NotExistArticle => "article does not exist",
            ErrorCode::AuthCheckTokenFail => "token verification failed",
            ErrorCode::AuthCheckTokenTimeout => "token has expired",
            ErrorCode::AuthToken => "token generation failed",
        }
    }
}
