use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Principal;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::LoginOutcome;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Argon2 work runs on the blocking pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Shared password hasher and token issuer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let hash = tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))??;
        Ok(hash)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(
        &self,
        command: CreateUserCommand,
        caller: Option<Principal>,
    ) -> Result<User, UserError> {
        let role = command.role.unwrap_or_default();
        if role.is_admin() && !caller.is_some_and(|p| p.is_admin()) {
            tracing::warn!(
                caller = ?caller.map(|p| p.user_id),
                "Rejected request to register an admin account"
            );
            return Err(UserError::Forbidden(
                "Only admins can assign the admin role".to_string(),
            ));
        }

        let password_hash = self.hash_password(command.password).await?;

        let user = NewUser {
            name: command.name,
            username: command.username,
            email: command.email,
            password_hash,
            role,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, role = %created_user.role, "User registered");

        Ok(created_user)
    }

    async fn login(
        &self,
        email: &EmailAddress,
        password: String,
    ) -> Result<LoginOutcome, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let Some(user) = self.repository.find_by_email(email).await? else {
            // Same Argon2 cost as a wrong password.
            let rejection =
                tokio::task::spawn_blocking(move || authenticator.reject_unknown_account(&password))
                    .await
                    .map_err(|e| {
                        UserError::Unknown(format!("Password verification task failed: {}", e))
                    })?;
            tracing::debug!(error = %rejection, "Login attempt for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let (user_id, role) = (user.id.as_i64(), user.role);
        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, user_id, role)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?;

        match result {
            Ok(authenticated) => Ok(LoginOutcome {
                user,
                access_token: authenticated.access_token,
            }),
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
                Err(UserError::InvalidCredentials)
            }
            Err(AuthenticationError::JwtError(e)) => {
                Err(UserError::Unknown(format!("Token issuance failed: {}", e)))
            }
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        caller: &Principal,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        if !caller.can_act_for(id.as_i64()) {
            return Err(UserError::Forbidden(
                "You can only update your own account".to_string(),
            ));
        }

        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_name) = command.name {
            user.name = new_name;
        }

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(new_password).await?;
        }

        self.repository.update(user).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth::PasswordError;
    use auth::PasswordHasher;
    use auth::Role;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::PersonName;
    use crate::domain::user::models::Username;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::new(SECRET).with_password_hasher(
                PasswordHasher::new()
                    .with_params(1024, 1, 1)
                    .expect("Failed to build hasher"),
            ),
        )
    }

    fn service(repository: MockTestUserRepository) -> UserService<MockTestUserRepository> {
        UserService::new(Arc::new(repository), authenticator())
    }

    fn stored(new_user: NewUser, id: i64) -> User {
        User {
            id: UserId(id),
            name: new_user.name,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn existing_user(id: i64, password_hash: String) -> User {
        User {
            id: UserId(id),
            name: PersonName::new("Ada".to_string(), "Lovelace".to_string()).unwrap(),
            username: Username::new(format!("user{}", id)).unwrap(),
            email: EmailAddress::new(format!("user{}@example.com", id)).unwrap(),
            password_hash,
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_command(password: &str) -> CreateUserCommand {
        CreateUserCommand::new(
            PersonName::new("Ada".to_string(), "Lovelace".to_string()).unwrap(),
            Username::new("testuser".to_string()).unwrap(),
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            password.to_string(),
        )
    }

    fn principal(user_id: i64, role: Role) -> Principal {
        Principal { user_id, role }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "testuser"
                    && user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2id$")
                    && user.role == Role::User
            })
            .times(1)
            .returning(|user| Ok(stored(user, 1)));

        let result = service(repository)
            .create_user(create_command("password123"), None)
            .await;

        let user = result.unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(user.username.as_str(), "testuser");
        // Password is hashed with real Argon2
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_create_user_short_password_rejected_before_storage() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_create().times(0);

        let result = service(repository)
            .create_user(create_command("12345"), None)
            .await;

        assert!(matches!(
            result.unwrap_err(),
            UserError::Password(PasswordError::TooShort { min: 6, actual: 5 })
        ));
    }

    #[tokio::test]
    async fn test_create_admin_requires_admin_caller() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_create().times(0);
        let service = service(repository);

        let anonymous = service
            .create_user(create_command("password123").with_role(Role::Admin), None)
            .await;
        assert!(matches!(anonymous.unwrap_err(), UserError::Forbidden(_)));

        let regular = service
            .create_user(
                create_command("password123").with_role(Role::Admin),
                Some(principal(7, Role::User)),
            )
            .await;
        assert!(matches!(regular.unwrap_err(), UserError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_can_create_admin() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_create()
            .withf(|user| user.role == Role::Admin)
            .times(1)
            .returning(|user| Ok(stored(user, 2)));

        let result = service(repository)
            .create_user(
                create_command("password123").with_role(Role::Admin),
                Some(principal(1, Role::Admin)),
            )
            .await;

        assert_eq!(result.unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ))
        });

        let result = service(repository)
            .create_user(create_command("password123"), None)
            .await;

        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_login_success_issues_verifiable_token() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("password123").unwrap();

        let mut repository = MockTestUserRepository::new();
        let user = existing_user(5, hash);
        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "user5@example.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));
        let email = EmailAddress::new("user5@example.com".to_string()).unwrap();
        let outcome = service
            .login(&email, "password123".to_string())
            .await
            .unwrap();

        assert_eq!(outcome.user.id, UserId(5));
        let claims = authenticator.validate_token(&outcome.access_token).unwrap();
        assert_eq!(claims.user_id, 5);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_the_same() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("password123").unwrap();

        let mut repository = MockTestUserRepository::new();
        let user = existing_user(5, hash);
        repository
            .expect_find_by_email()
            .returning(move |email| {
                if email.as_str() == "user5@example.com" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = UserService::new(Arc::new(repository), authenticator);

        let known = EmailAddress::new("user5@example.com".to_string()).unwrap();
        let wrong_password = service.login(&known, "wrongpass".to_string()).await;

        let unknown = EmailAddress::new("ghost@example.com".to_string()).unwrap();
        let unknown_email = service.login(&unknown, "password123".to_string()).await;

        assert!(matches!(
            wrong_password.unwrap_err(),
            UserError::InvalidCredentials
        ));
        assert!(matches!(
            unknown_email.unwrap_err(),
            UserError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository).get_user(&UserId(404)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_user_by_owner_rehashes_password() {
        let mut repository = MockTestUserRepository::new();

        let returned_user = existing_user(3, "$argon2id$old_hash".to_string());
        repository
            .expect_find_by_id()
            .withf(|id| *id == UserId(3))
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        repository
            .expect_update()
            .withf(|user| {
                user.username.as_str() == "newuser"
                    && user.password_hash.starts_with("$argon2id$")
                    && user.password_hash != "$argon2id$old_hash"
            })
            .times(1)
            .returning(|user| Ok(user));

        let command = UpdateUserCommand {
            username: Some(Username::new("newuser".to_string()).unwrap()),
            password: Some("newpassword".to_string()),
            ..Default::default()
        };

        let result = service(repository)
            .update_user(&principal(3, Role::User), &UserId(3), command)
            .await;

        assert_eq!(result.unwrap().username.as_str(), "newuser");
    }

    #[tokio::test]
    async fn test_update_other_user_forbidden_for_regular_user() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);
        repository.expect_update().times(0);

        let result = service(repository)
            .update_user(
                &principal(3, Role::User),
                &UserId(4),
                UpdateUserCommand::default(),
            )
            .await;

        assert!(matches!(result.unwrap_err(), UserError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_can_update_other_user() {
        let mut repository = MockTestUserRepository::new();
        let returned_user = existing_user(4, "$argon2id$hash".to_string());
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));
        repository.expect_update().times(1).returning(|user| Ok(user));

        let command = UpdateUserCommand {
            email: Some(EmailAddress::new("moved@example.com".to_string()).unwrap()),
            ..Default::default()
        };

        let result = service(repository)
            .update_user(&principal(1, Role::Admin), &UserId(4), command)
            .await;

        assert_eq!(result.unwrap().email.as_str(), "moved@example.com");
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_delete()
            .times(1)
            .returning(|id| Err(UserError::NotFound(id.to_string())));

        let result = service(repository).delete_user(&UserId(9)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }
}
