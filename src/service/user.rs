use uuid::Uuid;

use crate::auth::SubjectRole;
use crate::domain::{
    collapse_spaces, hyphenate_spaces, EditableUser, EditableUserWithPassword, Error, Name, Page, Password, User,
    UserFilter, UserPatch, Username,
};
use crate::store::tx::Tx;

use super::{validate_page, Service};

const DESC_CREATE: &str = "service: failed to create user";
const DESC_LIST: &str = "service: failed to list users";
const DESC_GET: &str = "service: failed to get user";
const DESC_PATCH: &str = "service: failed to patch user";
const DESC_UPDATE_PASSWORD: &str = "service: failed to update user password";
const DESC_DELETE: &str = "service: failed to delete user";
const DESC_SIGN_IN: &str = "service: failed to sign in user";

fn normalize(user: EditableUser) -> EditableUser {
    EditableUser {
        username: Username(hyphenate_spaces(user.username.as_str())),
        first_name: Name(collapse_spaces(user.first_name.as_str())),
        last_name: Name(collapse_spaces(user.last_name.as_str())),
    }
}

fn validate(user: &EditableUser) -> Result<(), Error> {
    if !user.username.valid() {
        return Err(Error::FieldInvalid("username"));
    }
    if !user.first_name.valid() {
        return Err(Error::FieldInvalid("firstName"));
    }
    if !user.last_name.valid() {
        return Err(Error::FieldInvalid("lastName"));
    }
    Ok(())
}

impl Service {
    pub async fn create_user(&self, input: EditableUserWithPassword) -> Result<User, Error> {
        let user = normalize(input.user);
        let result = validate(&user).and_then(|()| {
            if !self.authn().valid_password(input.password.as_str()) {
                return Err(Error::FieldInvalid("password"));
            }
            Ok(())
        });
        if let Err(err) = result {
            return Err(self.fail(err, DESC_CREATE));
        }

        let password_hash = self
            .authn()
            .hash_password(input.password.as_str())
            .map_err(|e| self.fail(Error::Unexpected(e.into()), DESC_CREATE))?;

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_CREATE))?;
        let result = self.create_user_in(&mut tx, &user, &password_hash).await;
        self.finish(tx, result, DESC_CREATE).await
    }

    async fn create_user_in(&self, tx: &mut Tx, user: &EditableUser, password_hash: &str) -> Result<User, Error> {
        let id = self.store().create_user(tx, user, password_hash).await?;
        self.store().get_user(tx, id).await
    }

    pub async fn list_users(&self, filter: UserFilter) -> Result<Page<User>, Error> {
        if let Err(err) = validate_page(&filter.page) {
            return Err(self.fail(err, DESC_LIST));
        }

        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_LIST))?;
        let result = self.store().list_users(&mut tx, &filter).await;
        self.finish(tx, result, DESC_LIST).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_GET))?;
        let result = self.store().get_user(&mut tx, id).await;
        self.finish(tx, result, DESC_GET).await
    }

    pub async fn patch_user(&self, id: Uuid, patch: UserPatch) -> Result<User, Error> {
        let patch = UserPatch {
            username: patch.username.map(|u| Username(hyphenate_spaces(u.as_str()))),
            first_name: patch.first_name.map(|n| Name(collapse_spaces(n.as_str()))),
            last_name: patch.last_name.map(|n| Name(collapse_spaces(n.as_str()))),
        };
        let invalid = [
            patch.username.as_ref().is_some_and(|u| !u.valid()).then_some("username"),
            patch.first_name.as_ref().is_some_and(|n| !n.valid()).then_some("firstName"),
            patch.last_name.as_ref().is_some_and(|n| !n.valid()).then_some("lastName"),
        ];
        if let Some(field) = invalid.into_iter().flatten().next() {
            return Err(self.fail(Error::FieldInvalid(field), DESC_PATCH));
        }

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_PATCH))?;
        let result = self.patch_user_in(&mut tx, id, &patch).await;
        self.finish(tx, result, DESC_PATCH).await
    }

    async fn patch_user_in(&self, tx: &mut Tx, id: Uuid, patch: &UserPatch) -> Result<User, Error> {
        self.store().patch_user(tx, id, patch).await?;
        self.store().get_user(tx, id).await
    }

    /// Changes the password after verifying the current one.
    pub async fn update_user_password(
        &self,
        username: Username,
        old_password: Password,
        password: Password,
    ) -> Result<(), Error> {
        if !self.authn().valid_password(password.as_str()) {
            return Err(self.fail(Error::FieldInvalid("password"), DESC_UPDATE_PASSWORD));
        }

        let password_hash = self
            .authn()
            .hash_password(password.as_str())
            .map_err(|e| self.fail(Error::Unexpected(e.into()), DESC_UPDATE_PASSWORD))?;

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_UPDATE_PASSWORD))?;
        let result = self
            .update_user_password_in(&mut tx, &username, &old_password, &password_hash)
            .await;
        self.finish(tx, result, DESC_UPDATE_PASSWORD).await
    }

    async fn update_user_password_in(
        &self,
        tx: &mut Tx,
        username: &Username,
        old_password: &Password,
        password_hash: &str,
    ) -> Result<(), Error> {
        let credentials = self.store().get_user_sign_in(tx, username).await?;
        let matches = self
            .authn()
            .check_password_hash(old_password.as_str(), &credentials.password_hash)
            .map_err(|e| Error::Unexpected(e.into()))?;
        if !matches {
            return Err(Error::CredentialsIncorrect);
        }

        self.store().update_user_password(tx, username, password_hash).await
    }

    /// Sets a new password without verifying the current one. Reserved for
    /// administrative resets.
    pub async fn reset_user_password(&self, username: Username, password: Password) -> Result<(), Error> {
        if !self.authn().valid_password(password.as_str()) {
            return Err(self.fail(Error::FieldInvalid("password"), DESC_UPDATE_PASSWORD));
        }

        let password_hash = self
            .authn()
            .hash_password(password.as_str())
            .map_err(|e| self.fail(Error::Unexpected(e.into()), DESC_UPDATE_PASSWORD))?;

        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_UPDATE_PASSWORD))?;
        let result = self.store().update_user_password(&mut tx, &username, &password_hash).await;
        self.finish(tx, result, DESC_UPDATE_PASSWORD).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<User, Error> {
        let mut tx = self.begin_write().await.map_err(|e| self.fail(e, DESC_DELETE))?;
        let result = self.delete_user_in(&mut tx, id).await;
        self.finish(tx, result, DESC_DELETE).await
    }

    async fn delete_user_in(&self, tx: &mut Tx, id: Uuid) -> Result<User, Error> {
        let user = self.store().get_user(tx, id).await?;
        self.store().delete_user(tx, id).await?;
        Ok(user)
    }

    /// Verifies the credentials and issues a token carrying the `user` role.
    /// An unknown username and a wrong password are indistinguishable to the
    /// caller.
    pub async fn sign_in_user(&self, username: Username, password: Password) -> Result<String, Error> {
        let mut tx = self.begin_read().await.map_err(|e| self.fail(e, DESC_SIGN_IN))?;
        let result = self.sign_in_user_in(&mut tx, &username, &password).await;
        self.finish(tx, result, DESC_SIGN_IN).await
    }

    async fn sign_in_user_in(&self, tx: &mut Tx, username: &Username, password: &Password) -> Result<String, Error> {
        let credentials = match self.store().get_user_sign_in(tx, username).await {
            Ok(credentials) => credentials,
            Err(Error::UserNotFound) => return Err(Error::CredentialsIncorrect),
            Err(err) => return Err(err),
        };

        let matches = self
            .authn()
            .check_password_hash(password.as_str(), &credentials.password_hash)
            .map_err(|e| Error::Unexpected(e.into()))?;
        if !matches {
            return Err(Error::CredentialsIncorrect);
        }

        let user = self.store().get_user_by_username(tx, username).await?;
        self.authn()
            .new_token(user.id, &[SubjectRole::User])
            .map_err(|e| Error::Unexpected(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::auth::AuthnService;
    use crate::domain::{EditableUser, EditableUserWithPassword, Error, Name, Password, Username};
    use crate::testing::MockStore;

    use super::super::Service;

    fn authn() -> AuthnService {
        AuthnService::with_fast_params(b"test-key")
    }

    #[tokio::test]
    async fn sign_in_does_not_reveal_whether_the_username_exists() {
        let store = Arc::new(MockStore::new());
        let hash = authn().hash_password("correct-horse-battery-1").unwrap();
        store.add_user("ana", &hash);

        let service = Service::new(authn(), store);

        let wrong_password = service
            .sign_in_user(Username("ana".into()), Password("wrong-horse-battery-1".into()))
            .await
            .unwrap_err();
        let unknown_user = service
            .sign_in_user(Username("nobody".into()), Password("correct-horse-battery-1".into()))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, Error::CredentialsIncorrect));
        assert!(matches!(unknown_user, Error::CredentialsIncorrect));
    }

    #[tokio::test]
    async fn sign_in_with_correct_credentials_issues_a_user_token() {
        let store = Arc::new(MockStore::new());
        let hash = authn().hash_password("correct-horse-battery-1").unwrap();
        let user_id = store.add_user("ana", &hash);

        let service = Service::new(authn(), store);

        let token = service
            .sign_in_user(Username("ana".into()), Password("correct-horse-battery-1".into()))
            .await
            .unwrap();
        let claims = authn().parse_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[tokio::test]
    async fn policy_violating_password_is_rejected_before_any_store_call() {
        // Every store method of the empty mock panics on use, so reaching the
        // store at all would fail this test.
        let service = Service::new(authn(), Arc::new(MockStore::new()));

        let input = EditableUserWithPassword {
            user: EditableUser {
                username: Username("ana".into()),
                first_name: Name("Ana".into()),
                last_name: Name("Silva".into()),
            },
            password: Password("short1!".into()),
        };
        let err = service.create_user(input).await.unwrap_err();
        assert!(matches!(err, Error::FieldInvalid("password")));
    }
}
