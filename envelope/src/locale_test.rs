use super::*;

#[test]
fn from_path_reads_first_segment() {
    assert_eq!(Locale::from_path("/ar/feed"), Locale::Ar);
    assert_eq!(Locale::from_path("/en/users/42/posts"), Locale::En);
}

#[test]
fn from_path_falls_back_for_unknown_or_missing_segment() {
    assert_eq!(Locale::from_path("/"), DEFAULT_LOCALE);
    assert_eq!(Locale::from_path(""), DEFAULT_LOCALE);
    assert_eq!(Locale::from_path("/feed"), DEFAULT_LOCALE);
    assert_eq!(Locale::from_path("/AR/feed"), DEFAULT_LOCALE);
}

#[test]
fn login_path_uses_locale_code() {
    assert_eq!(Locale::Ar.login_path(), "/ar/login");
    assert_eq!(Locale::En.login_path(), "/en/login");
}

#[test]
fn parse_rejects_unknown_code() {
    assert_eq!("fr".parse::<Locale>(), Err(UnknownLocale("fr".into())));
}

#[test]
fn every_locale_parses_from_its_code() {
    for locale in Locale::ALL {
        assert_eq!(locale.code().parse::<Locale>(), Ok(locale));
        assert_eq!(locale.to_string(), locale.code());
    }
}
