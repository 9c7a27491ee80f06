//! User-facing messages returned by the account actions

// Signup
pub const EMAIL_ALREADY_REGISTERED: &str = "This email address is already registered";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const INVALID_PASSWORD: &str = "Invalid password";
pub const FAILED_TO_CREATE_ACCOUNT: &str = "Failed to create account";
pub const FAILED_TO_CREATE_USER: &str = "Failed to create user";
pub const FAILED_TO_SAVE_USER_DATA: &str = "Failed to save user data";

// Login / logout
pub const INVALID_LOGIN: &str = "無効なログイン情報です";
pub const EMAIL_NOT_CONFIRMED: &str = "メールアドレスが確認されていません";
pub const LOGIN_FAILED: &str = "ログインに失敗しました";
pub const LOGOUT_FAILED: &str = "ログアウトに失敗しました";

// Password reset request
pub const EMAIL_REQUIRED: &str = "メールアドレスが入力されていません";
pub const EMAIL_NOT_FOUND: &str = "指定されたメールアドレスが見つかりません";
pub const RESET_RATE_LIMITED: &str =
    "短時間に複数回のリクエストがあります。しばらく時間をおいてから再度お試しください";
pub const RESET_REQUEST_FAILED: &str = "パスワードリセットの申請に失敗しました";

// Password update
pub const PASSWORD_REQUIRED: &str = "パスワードが入力されていません";
pub const RESET_SESSION_MISSING: &str =
    "セッションが無効です。再度パスワードリセットを申請してください";
pub const PASSWORD_TOO_WEAK: &str = "パスワードが弱すぎます。より強力なパスワードを設定してください";
pub const PASSWORD_UNCHANGED: &str = "現在のパスワードと同じパスワードは設定できません";
pub const RESET_SESSION_EXPIRED: &str =
    "セッションの有効期限が切れています。再度パスワードリセットを申請してください";
pub const PASSWORD_UPDATE_FAILED: &str = "パスワードの更新に失敗しました";

pub const INVALID_INPUT: &str = "Invalid input";

pub const SYSTEM_ERROR: &str = "システムエラーが発生しました";
