//! Field sets for every form in the panel and the mapping from a form's
//! outcome to the `Action` the reducer handles.

use crate::api::{Product, ProductInput, User, UserInput};
use crate::core::action::{Action, Secret};
use crate::core::masks::text_without_space;
use crate::core::state::{AuthStep, Resource};
use crate::tui::components::{ButtonRole, FormEvent, FormField, FormState, FormValues, Rule};

pub fn login_form() -> FormState {
    FormState::new("Login")
        .field(
            FormField::text("username", "Usuário")
                .rule(Rule::Required("Nome de usuário é obrigatório")),
        )
        .field(FormField::secret("password", "Senha").rule(Rule::Required("Senha é obrigatória")))
        .field(FormField::checkbox("remember", "Lembrar-me"))
        .button("Esqueceu sua senha?", ButtonRole::Secondary)
        .button("Entrar", ButtonRole::Submit)
}

fn forgot_password_form() -> FormState {
    FormState::new("Trocar Senha")
        .field(
            FormField::text("email", "Email")
                .with_placeholder("Digite seu email")
                .rule(Rule::Required("Email é obrigatório")),
        )
        .button("Voltar", ButtonRole::Cancel)
        .button("Enviar", ButtonRole::Submit)
}

fn verify_code_form() -> FormState {
    FormState::new("Trocar Senha")
        .field(
            FormField::text("code", "Código")
                .with_placeholder("Digite o código recebido")
                .rule(Rule::Required("Código é obrigatório")),
        )
        .button("Voltar", ButtonRole::Cancel)
        .button("Enviar", ButtonRole::Submit)
}

fn reset_password_form() -> FormState {
    FormState::new("Reset Password")
        .field(
            FormField::secret("password", "Password")
                .rule(Rule::Required("Password is required"))
                .rule(Rule::MinLength(6, "Password must be at least 6 characters long")),
        )
        .field(
            FormField::secret("repeat_password", "Repeat Password")
                .rule(Rule::Required("Repeat password is required"))
                .rule(Rule::Matches("password", "Passwords do not match")),
        )
        .button("Voltar", ButtonRole::Cancel)
        .button("Enviar", ButtonRole::Submit)
}

/// A fresh form for the given login step.
pub fn auth_form(step: AuthStep) -> FormState {
    match step {
        AuthStep::Login => login_form(),
        AuthStep::ForgotPassword => forgot_password_form(),
        AuthStep::VerifyCode => verify_code_form(),
        AuthStep::ResetPassword => reset_password_form(),
    }
}

/// Create form when `user` is `None`, edit form pre-filled from it otherwise.
pub fn user_form(user: Option<&User>) -> FormState {
    let input = user.map(UserInput::from).unwrap_or_default();
    let (title, submit) = match user {
        Some(_) => ("Editar Usuário", "Salvar"),
        None => ("Criar Novo Usuário", "Criar"),
    };
    FormState::new(title)
        .field(
            FormField::text("name", "Nome")
                .with_value(input.name)
                .with_placeholder("Digite seu nome")
                .rule(Rule::Required("Nome é obrigatório")),
        )
        .field(
            FormField::text("email", "Email")
                .with_value(input.email)
                .with_placeholder("Digite seu email")
                .rule(Rule::Required("Email é obrigatório")),
        )
        .field(
            FormField::text("role", "Função")
                .with_value(input.role)
                .with_placeholder("Digite sua função")
                .rule(Rule::Required("Função é obrigatório")),
        )
        .field(
            FormField::text("status", "Status")
                .with_value(input.status)
                .with_placeholder("Digite o status")
                .rule(Rule::Required("Status é obrigatório")),
        )
        .button("Voltar", ButtonRole::Cancel)
        .button(submit, ButtonRole::Submit)
}

pub fn product_form(product: Option<&Product>) -> FormState {
    let (title, submit, category) = match product {
        Some(p) => ("Editar Produto", "Salvar", p.category.to_string()),
        None => ("Criar Novo Produto", "Criar", String::new()),
    };
    let input = product.map(ProductInput::from).unwrap_or_default();
    FormState::new(title)
        .field(
            FormField::text("name", "Nome")
                .with_value(input.name)
                .with_placeholder("Digite seu nome")
                .rule(Rule::Required("Nome é obrigatório")),
        )
        .field(
            FormField::text("category", "Categoria")
                .with_value(category)
                .with_placeholder("Digite a categoria")
                .rule(Rule::Required("Categoria é obrigatório"))
                .rule(Rule::Numeric("Categoria deve ser um número")),
        )
        .field(
            FormField::text("price", "Preço")
                .with_value(input.price)
                .with_placeholder("Digite o preço")
                .rule(Rule::Required("Preço é obrigatório")),
        )
        .field(
            FormField::text("stock", "Estoque")
                .with_value(input.stock)
                .with_placeholder("Digite o estoque")
                .rule(Rule::Required("Estoque é obrigatório")),
        )
        .button("Voltar", ButtonRole::Cancel)
        .button(submit, ButtonRole::Submit)
}

pub fn user_input(values: &FormValues) -> UserInput {
    UserInput {
        name: values.get("name").to_string(),
        email: values.get("email").to_string(),
        role: values.get("role").to_string(),
        status: values.get("status").to_string(),
    }
}

/// Category was validated as numeric; anything else falls back to 0.
pub fn product_input(values: &FormValues) -> ProductInput {
    ProductInput {
        name: values.get("name").to_string(),
        category: values.get("category").trim().parse().unwrap_or(0),
        price: values.get("price").to_string(),
        stock: values.get("stock").to_string(),
    }
}

/// What a login-screen form outcome asks the reducer to do.
pub fn auth_action(step: AuthStep, event: FormEvent) -> Option<Action> {
    match (step, event) {
        (AuthStep::Login, FormEvent::Submit(values)) => Some(Action::SubmitLogin {
            username: text_without_space(values.get("username")),
            password: Secret::new(values.get("password")),
            remember: values.is_checked("remember"),
        }),
        (AuthStep::Login, FormEvent::Secondary) => {
            Some(Action::ShowAuthStep(AuthStep::ForgotPassword))
        }
        (AuthStep::Login, FormEvent::Cancel) => None,
        (AuthStep::ForgotPassword, FormEvent::Submit(values)) => Some(
            Action::SubmitRecoveryEmail(values.get("email").to_string()),
        ),
        (AuthStep::VerifyCode, FormEvent::Submit(values)) => {
            Some(Action::SubmitRecoveryCode(values.get("code").to_string()))
        }
        (AuthStep::ResetPassword, FormEvent::Submit(values)) => Some(Action::SubmitNewPassword(
            Secret::new(values.get("password")),
        )),
        (_, FormEvent::Cancel | FormEvent::Secondary) => {
            Some(Action::ShowAuthStep(AuthStep::Login))
        }
    }
}

/// What a create/edit form outcome asks the reducer to do.
pub fn resource_action(resource: Resource, event: FormEvent) -> Option<Action> {
    match (resource, event) {
        (Resource::Users, FormEvent::Submit(values)) => {
            Some(Action::SubmitUser(user_input(&values)))
        }
        (Resource::Products, FormEvent::Submit(values)) => {
            Some(Action::SubmitProduct(product_input(&values)))
        }
        (_, FormEvent::Cancel) => Some(Action::CloseForm(resource)),
        (_, FormEvent::Secondary) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::component::EventHandler;
    use crate::tui::event::TuiEvent;

    fn type_text(form: &mut FormState, text: &str) {
        for c in text.chars() {
            form.handle_event(&TuiEvent::Char(c));
        }
    }

    #[test]
    fn test_login_submit_builds_action() {
        let mut form = login_form();
        type_text(&mut form, " ana ");
        form.handle_event(&TuiEvent::Tab);
        type_text(&mut form, "pw");
        form.handle_event(&TuiEvent::Tab);
        form.handle_event(&TuiEvent::Char(' '));
        let event = form.handle_event(&TuiEvent::Enter).unwrap();
        assert_eq!(
            auth_action(AuthStep::Login, event),
            Some(Action::SubmitLogin {
                username: "ana".into(),
                password: Secret::new("pw"),
                remember: true,
            })
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        let mut form = login_form();
        assert!(form.handle_event(&TuiEvent::Enter).is_none());
        assert_eq!(form.error("username"), Some("Nome de usuário é obrigatório"));
        assert_eq!(form.error("password"), Some("Senha é obrigatória"));
    }

    #[test]
    fn test_forgot_password_button_and_back() {
        assert_eq!(
            auth_action(AuthStep::Login, FormEvent::Secondary),
            Some(Action::ShowAuthStep(AuthStep::ForgotPassword))
        );
        assert_eq!(
            auth_action(AuthStep::VerifyCode, FormEvent::Cancel),
            Some(Action::ShowAuthStep(AuthStep::Login))
        );
        assert_eq!(auth_action(AuthStep::Login, FormEvent::Cancel), None);
    }

    #[test]
    fn test_reset_password_rules() {
        let mut form = auth_form(AuthStep::ResetPassword);
        type_text(&mut form, "abcdef");
        form.handle_event(&TuiEvent::Tab);
        type_text(&mut form, "abcdeg");
        assert!(form.handle_event(&TuiEvent::Enter).is_none());
        assert_eq!(form.error("repeat_password"), Some("Passwords do not match"));
        form.handle_event(&TuiEvent::Backspace);
        type_text(&mut form, "f");
        let event = form.handle_event(&TuiEvent::Enter).unwrap();
        assert_eq!(
            auth_action(AuthStep::ResetPassword, event),
            Some(Action::SubmitNewPassword(Secret::new("abcdef")))
        );
    }

    #[test]
    fn test_edit_user_form_is_prefilled() {
        let user = User {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@x.com".into(),
            role: "admin".into(),
            status: "ativo".into(),
        };
        let mut form = user_form(Some(&user));
        assert_eq!(form.title, "Editar Usuário");
        assert_eq!(form.value("email"), "ana@x.com");
        let event = form.handle_event(&TuiEvent::Enter).unwrap();
        assert_eq!(
            resource_action(Resource::Users, event),
            Some(Action::SubmitUser(UserInput::from(&user)))
        );
    }

    #[test]
    fn test_create_product_form_parses_category() {
        let mut form = product_form(None);
        assert_eq!(form.title, "Criar Novo Produto");
        type_text(&mut form, "Caneta");
        form.handle_event(&TuiEvent::Tab);
        type_text(&mut form, " 7 ");
        form.handle_event(&TuiEvent::Tab);
        type_text(&mut form, "2,50");
        form.handle_event(&TuiEvent::Tab);
        type_text(&mut form, "10");
        let event = form.handle_event(&TuiEvent::Enter).unwrap();
        assert_eq!(
            resource_action(Resource::Products, event),
            Some(Action::SubmitProduct(ProductInput {
                name: "Caneta".into(),
                category: 7,
                price: "2,50".into(),
                stock: "10".into(),
            }))
        );
    }

    #[test]
    fn test_cancel_closes_resource_form() {
        assert_eq!(
            resource_action(Resource::Products, FormEvent::Cancel),
            Some(Action::CloseForm(Resource::Products))
        );
    }
}
