//! HTML templates, compiled into the binary.

use tera::{Context, Tera};

use crate::middleware::error::AppResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("includes/paginator.html", include_str!("../templates/includes/paginator.html")),
    ("includes/post_card.html", include_str!("../templates/includes/post_card.html")),
    ("posts/index.html", include_str!("../templates/posts/index.html")),
    ("posts/group_list.html", include_str!("../templates/posts/group_list.html")),
    ("posts/profile.html", include_str!("../templates/posts/profile.html")),
    ("posts/post_detail.html", include_str!("../templates/posts/post_detail.html")),
    ("posts/create_post.html", include_str!("../templates/posts/create_post.html")),
    ("posts/follow.html", include_str!("../templates/posts/follow.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
    ("users/logged_out.html", include_str!("../templates/users/logged_out.html")),
];

/// Build the template engine with every page registered.
pub fn load() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}

pub fn render(tera: &Tera, name: &str, context: &Context) -> AppResult<String> {
    Ok(tera.render(name, context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_compile() {
        let tera = load().unwrap();
        for (name, _) in TEMPLATES {
            assert!(tera.get_template_names().any(|n| n == *name), "{name}");
        }
    }
}
