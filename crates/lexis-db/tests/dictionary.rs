use std::collections::BTreeMap;

use lexis_db::completeness::{EntityKind, FillTarget};
use lexis_db::filter::WordFilter;
use lexis_db::slug::MAX_WORD_SLUG_LEN;
use lexis_db::{Database, DbError};
use lexis_types::api::{
    CategoryRequest, CreateTranslationRequest, LocalizedText, TagRequest,
    UpdateEntityTranslationsRequest, WordPayload, WordTranslationsQuery,
};
use lexis_types::models::{ChangeAction, WordStatus};

fn db_with(languages: &[(&str, &str)]) -> Database {
    let db = Database::open_in_memory().unwrap();
    for (code, name) in languages {
        db.create_language(code, name).unwrap();
    }
    db
}

fn payload(word: &str, meaning: &str, language: &str, status: WordStatus) -> WordPayload {
    WordPayload {
        word: word.to_string(),
        meaning: meaning.to_string(),
        language: language.to_string(),
        category_id: None,
        tags: Vec::new(),
        status: Some(status),
        difficulty: None,
        pronunciation: String::new(),
    }
}

fn edge_to(to_word_id: i64) -> CreateTranslationRequest {
    CreateTranslationRequest {
        to_word_id,
        note: String::new(),
        order: 0,
        status: None,
    }
}

// -- Slugs --

#[test]
fn cyrillic_word_gets_transliterated_slug() {
    let db = db_with(&[("ru", "Russian")]);
    let word = db
        .create_word(&payload("дом", "house", "ru", WordStatus::Pending), None)
        .unwrap();
    assert_eq!(word.slug, "dom-ru");
    assert_eq!(word.status, WordStatus::Pending);
}

#[test]
fn language_codes_must_be_slug_safe() {
    let db = db_with(&[]);
    for code in ["pt BR", "EN", "a/b", "en?", "-en"] {
        assert!(
            matches!(db.create_language(code, "Broken"), Err(DbError::Validation(_))),
            "{code:?} was accepted"
        );
    }
    assert!(db.list_languages().unwrap().is_empty());

    db.create_language("pt-br", "Portuguese").unwrap();
    let casa = db
        .create_word(&payload("casa", "house", "pt-br", WordStatus::Approved), None)
        .unwrap();
    assert_eq!(casa.slug, "casa-pt-br");
}

#[test]
fn same_normalized_text_gets_counter_suffix() {
    let db = db_with(&[("ru", "Russian")]);
    db.create_word(&payload("дом", "house", "ru", WordStatus::Approved), None)
        .unwrap();
    let second = db
        .create_word(&payload("Дом", "House, capitalised", "ru", WordStatus::Approved), None)
        .unwrap();
    assert_eq!(second.slug, "dom-ru-1");
}

#[test]
fn editing_a_word_keeps_its_slug() {
    let db = db_with(&[("ru", "Russian")]);
    let word = db
        .create_word(&payload("дом", "house", "ru", WordStatus::Pending), None)
        .unwrap();

    let edited = db
        .update_word(&word.slug, &payload("дом", "a house", "ru", WordStatus::Approved), None)
        .unwrap();
    assert_eq!(edited.slug, "dom-ru");
    assert_eq!(edited.meaning, "a house");

    let renamed = db
        .update_word(&word.slug, &payload("домик", "a small house", "ru", WordStatus::Approved), None)
        .unwrap();
    assert_eq!(renamed.slug, "dom-ru");
    assert_eq!(renamed.word, "домик");
}

#[test]
fn very_long_words_stay_within_slug_limit() {
    let db = db_with(&[("en", "English")]);
    let long = "x".repeat(100);
    let word = db
        .create_word(&payload(&long, "long", "en", WordStatus::Pending), None)
        .unwrap();
    assert!(word.slug.len() <= MAX_WORD_SLUG_LEN);
    assert!(word.slug.ends_with("-en"));
}

#[test]
fn repair_on_unique_slugs_changes_nothing() {
    let db = db_with(&[("ru", "Russian")]);
    db.create_word(&payload("дом", "house", "ru", WordStatus::Pending), None)
        .unwrap();
    db.create_word(&payload("Дом", "house", "ru", WordStatus::Pending), None)
        .unwrap();
    assert!(db.repair_slugs(true).unwrap().is_empty());
    assert!(db.repair_slugs(false).unwrap().is_empty());
}

// -- Word validation --

#[test]
fn duplicate_text_in_one_language_is_rejected() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    db.create_word(&payload("cat", "animal", "en", WordStatus::Pending), None)
        .unwrap();

    let err = db
        .create_word(&payload("cat", "another", "en", WordStatus::Pending), None)
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(m) if m.contains("already exists")));

    // Same text in another language is fine.
    db.create_word(&payload("cat", "кот", "ru", WordStatus::Pending), None)
        .unwrap();
}

#[test]
fn blank_text_or_meaning_is_rejected() {
    let db = db_with(&[("en", "English")]);
    let err = db
        .create_word(&payload("  ", "animal", "en", WordStatus::Pending), None)
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));

    let err = db
        .create_word(&payload("cat", "", "en", WordStatus::Pending), None)
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
}

#[test]
fn unknown_language_is_not_found() {
    let db = db_with(&[("en", "English")]);
    let err = db
        .create_word(&payload("cat", "animal", "xx", WordStatus::Pending), None)
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

// -- Translation edges --

#[test]
fn translation_edges_are_validated() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    let cat = db
        .create_word(&payload("cat", "animal", "en", WordStatus::Approved), None)
        .unwrap();
    let kitty = db
        .create_word(&payload("kitty", "young cat", "en", WordStatus::Approved), None)
        .unwrap();
    let kot = db
        .create_word(&payload("кот", "animal", "ru", WordStatus::Approved), None)
        .unwrap();

    let err = db.create_translation(&cat.slug, &edge_to(cat.id)).unwrap_err();
    assert!(matches!(err, DbError::Validation(m) if m.contains("itself")));

    let err = db.create_translation(&cat.slug, &edge_to(kitty.id)).unwrap_err();
    assert!(matches!(err, DbError::Validation(m) if m.contains("own language")));

    let edge = db.create_translation(&cat.slug, &edge_to(kot.id)).unwrap();
    assert_eq!(edge.from_word_id, cat.id);
    assert_eq!(edge.status, WordStatus::Approved);

    let err = db.create_translation(&cat.slug, &edge_to(kot.id)).unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));

    // The reverse direction is a different edge.
    db.create_translation(&kot.slug, &edge_to(cat.id)).unwrap();
}

#[test]
fn language_change_cannot_break_edges() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    let cat = db
        .create_word(&payload("cat", "animal", "en", WordStatus::Approved), None)
        .unwrap();
    let kot = db
        .create_word(&payload("кот", "animal", "ru", WordStatus::Approved), None)
        .unwrap();
    db.create_translation(&cat.slug, &edge_to(kot.id)).unwrap();

    let err = db
        .update_word(&cat.slug, &payload("cat", "animal", "ru", WordStatus::Approved), None)
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
}

#[test]
fn detail_hides_unpublished_translations_from_readers() {
    let db = db_with(&[("en", "English"), ("ru", "Russian"), ("kk", "Kazakh")]);
    let cat = db
        .create_word(&payload("cat", "animal", "en", WordStatus::Approved), None)
        .unwrap();
    let kot = db
        .create_word(&payload("кот", "animal", "ru", WordStatus::Approved), None)
        .unwrap();
    let mysyq = db
        .create_word(&payload("мысық", "animal", "kk", WordStatus::Pending), None)
        .unwrap();
    db.create_translation(&cat.slug, &edge_to(kot.id)).unwrap();
    db.create_translation(&cat.slug, &edge_to(mysyq.id)).unwrap();

    let public = db.word_detail(&cat.slug, false, "en").unwrap();
    assert_eq!(public.translations.len(), 1);
    assert_eq!(public.translations[0].word, "кот");

    let staff = db.word_detail(&cat.slug, true, "en").unwrap();
    assert_eq!(staff.translations.len(), 2);

    let err = db.word_detail(&mysyq.slug, false, "en").unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

// -- Multi-translation --

#[test]
fn multi_translate_creates_pending_words_and_edges() {
    let db = db_with(&[("ru", "Russian"), ("en", "English"), ("de", "German")]);
    let dom = db
        .create_word(&payload("дом", "жилище", "ru", WordStatus::Approved), None)
        .unwrap();

    let mut texts = BTreeMap::new();
    texts.insert("en".to_string(), "house".to_string());
    texts.insert("ru".to_string(), "дом".to_string());
    texts.insert("de".to_string(), "  ".to_string());

    let outcome = db.multi_translate(&dom.slug, &texts, None).unwrap();
    assert_eq!(outcome.created_words, 1);
    assert_eq!(outcome.created_translations, 1);
    assert_eq!(outcome.existing_translations, 0);

    let house = db.get_word_by_slug("house-en").unwrap().unwrap();
    assert_eq!(house.status, WordStatus::Pending);
    assert_eq!(house.meaning, "жилище");

    let again = db.multi_translate(&dom.slug, &texts, None).unwrap();
    assert_eq!(again.created_words, 0);
    assert_eq!(again.created_translations, 0);
    assert_eq!(again.existing_translations, 1);
}

#[test]
fn multi_translate_leaves_approved_edges_alone() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    let cat = db
        .create_word(&payload("cat", "small animal", "en", WordStatus::Approved), None)
        .unwrap();
    let kot = db
        .create_word(&payload("кот", "домашнее животное", "ru", WordStatus::Approved), None)
        .unwrap();
    let mut request = edge_to(kot.id);
    request.order = 3;
    db.create_translation(&cat.slug, &request).unwrap();

    let texts = BTreeMap::from([("ru".to_string(), "кот".to_string())]);
    let outcome = db.multi_translate(&cat.slug, &texts, None).unwrap();
    assert_eq!(outcome.created_words, 0);
    assert_eq!(outcome.created_translations, 0);
    assert_eq!(outcome.existing_translations, 1);

    let detail = db.word_detail(&cat.slug, false, "en").unwrap();
    assert_eq!(detail.translations.len(), 1);
    assert_eq!(detail.translations[0].status, WordStatus::Approved);
    assert_eq!(detail.translations[0].order, 3);

    let translated = WordFilter::published().translated(true);
    assert_eq!(db.count_words(&translated).unwrap(), 1);
}

#[test]
fn bulk_translate_rolls_back_on_unknown_language() {
    use lexis_types::api::BulkTranslateItem;

    let db = db_with(&[("ru", "Russian"), ("en", "English")]);
    let dom = db
        .create_word(&payload("дом", "жилище", "ru", WordStatus::Approved), None)
        .unwrap();

    let items = vec![
        BulkTranslateItem {
            word_id: dom.id,
            language: "en".into(),
            text: "house".into(),
        },
        BulkTranslateItem {
            word_id: dom.id,
            language: "zz".into(),
            text: "haus".into(),
        },
    ];
    let err = db.bulk_translate(&items, None).unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
    assert!(db.get_word_by_slug("house-en").unwrap().is_none());
}

#[test]
fn suggestions_prefer_approved_then_similar_then_stand_in() {
    use lexis_types::api::SuggestionSource;

    let db = db_with(&[("en", "English"), ("ru", "Russian"), ("de", "German"), ("kk", "Kazakh")]);
    let cat = db
        .create_word(&payload("Cat", "small animal", "en", WordStatus::Approved), None)
        .unwrap();
    let dog = db
        .create_word(&payload("dog", "barks", "en", WordStatus::Approved), None)
        .unwrap();
    let kot = db
        .create_word(&payload("кот", "животное", "ru", WordStatus::Approved), None)
        .unwrap();
    let sobaka = db
        .create_word(&payload("собака", "лает", "ru", WordStatus::Approved), None)
        .unwrap();
    db.create_word(&payload("Catering", "Verpflegung", "de", WordStatus::Pending), None)
        .unwrap();
    db.create_translation(&cat.slug, &edge_to(kot.id)).unwrap();
    let mut pending = edge_to(sobaka.id);
    pending.status = Some(WordStatus::Pending);
    db.create_translation(&dog.slug, &pending).unwrap();

    let languages: Vec<String> = ["ru", "de", "kk", "en"].iter().map(|c| c.to_string()).collect();
    let suggestions = db
        .suggest_translations(&[cat.id, 9999, dog.id], &languages)
        .unwrap();

    let found: Vec<(i64, &str, &str, SuggestionSource)> = suggestions
        .iter()
        .map(|s| (s.word_id, s.language.as_str(), s.text.as_str(), s.source))
        .collect();
    assert_eq!(
        found,
        vec![
            (cat.id, "ru", "кот", SuggestionSource::Approved),
            (cat.id, "de", "[SIMILAR] Catering", SuggestionSource::Similar),
            (cat.id, "kk", "[AUTO] Cat (kk)", SuggestionSource::Auto),
            (dog.id, "ru", "[AUTO] dog (ru)", SuggestionSource::Auto),
            (dog.id, "de", "[AUTO] dog (de)", SuggestionSource::Auto),
            (dog.id, "kk", "[AUTO] dog (kk)", SuggestionSource::Auto),
        ]
    );

    let err = db.suggest_translations(&[cat.id], &["zz".to_string()]).unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

// -- Listing --

#[test]
fn published_english_search_is_filtered_and_sorted() {
    let db = db_with(&[("en", "English"), ("de", "German")]);
    for (word, meaning, lang, status) in [
        ("dog", "not a CAT at all", "en", WordStatus::Approved),
        ("Catalog", "a list", "en", WordStatus::Approved),
        ("cat", "small animal", "en", WordStatus::Approved),
        ("cattle", "cows", "en", WordStatus::Pending),
        ("Katze", "cat", "de", WordStatus::Approved),
        ("bird", "flies", "en", WordStatus::Approved),
    ] {
        db.create_word(&payload(word, meaning, lang, status), None)
            .unwrap();
    }
    let catfish = db
        .create_word(&payload("catfish", "fish", "en", WordStatus::Approved), None)
        .unwrap();
    db.soft_delete_word(&catfish.slug, None).unwrap();

    let filter = WordFilter::published().language("en").search("cat");
    let page = db.list_words(&filter, 1).unwrap();
    let words: Vec<&str> = page.items.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(words, vec!["cat", "Catalog", "dog"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.num_pages, 1);

    // Elevated view also sees the pending word, but never the deleted one.
    let staff = WordFilter::all_non_deleted().language("en").search("CAT");
    assert_eq!(db.count_words(&staff).unwrap(), 4);
}

#[test]
fn listing_pages_hold_twenty_words() {
    let db = db_with(&[("en", "English")]);
    for i in 1..=25 {
        db.create_word(
            &payload(&format!("cat{i:02}"), "numbered cat", "en", WordStatus::Approved),
            None,
        )
        .unwrap();
    }
    let filter = WordFilter::published().search("cat");

    let first = db.list_words(&filter, 1).unwrap();
    assert_eq!(first.items.len(), 20);
    assert_eq!(first.items[0].word, "cat01");
    assert!(first.has_next());

    let last = db.list_words(&filter, 99).unwrap();
    assert_eq!(last.page, 2);
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.items[4].word, "cat25");
}

#[test]
fn translated_filter_counts_only_approved_edges() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    let cat = db
        .create_word(&payload("cat", "animal", "en", WordStatus::Approved), None)
        .unwrap();
    let dog = db
        .create_word(&payload("dog", "animal", "en", WordStatus::Approved), None)
        .unwrap();
    let kot = db
        .create_word(&payload("кот", "animal", "ru", WordStatus::Approved), None)
        .unwrap();
    let sobaka = db
        .create_word(&payload("собака", "animal", "ru", WordStatus::Approved), None)
        .unwrap();
    db.create_translation(&cat.slug, &edge_to(kot.id)).unwrap();
    let mut pending = edge_to(sobaka.id);
    pending.status = Some(WordStatus::Pending);
    db.create_translation(&dog.slug, &pending).unwrap();

    let translated = WordFilter::published().language("en").translated(true);
    let page = db.list_words(&translated, 1).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].word, "cat");

    let dashboard = db
        .word_translations_dashboard(&WordTranslationsQuery {
            q: None,
            source_lang: Some("en".into()),
            category: None,
            status: Some("untranslated".into()),
            page: None,
        })
        .unwrap();
    assert_eq!(dashboard.total_words, 2);
    assert_eq!(dashboard.translated_words, 1);
    assert_eq!(dashboard.untranslated_words, 1);
    assert_eq!(dashboard.words.items[0].word, "dog");
}

#[test]
fn check_translations_finds_exact_or_similar() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    let cat = db
        .create_word(&payload("cat", "animal", "en", WordStatus::Approved), None)
        .unwrap();
    db.create_word(&payload("catalog", "list", "en", WordStatus::Approved), None)
        .unwrap();
    let kot = db
        .create_word(&payload("кот", "animal", "ru", WordStatus::Approved), None)
        .unwrap();
    db.create_translation(&cat.slug, &edge_to(kot.id)).unwrap();

    let found = db.check_translations("CAT", "en").unwrap();
    assert!(found.exists);
    assert_eq!(found.word_id, Some(cat.id));
    assert_eq!(found.translations.len(), 1);
    assert_eq!(found.translations[0].language, "ru");

    let similar = db.check_translations("cata", "en").unwrap();
    assert!(!similar.exists);
    assert_eq!(similar.similar_words.len(), 1);
    assert_eq!(similar.similar_words[0].word, "catalog");
}

// -- Audit --

#[test]
fn status_changes_are_logged() {
    let db = db_with(&[("en", "English")]);
    let user = db.create_user("moder", "hash", None).unwrap();
    let cat = db
        .create_word(&payload("cat", "animal", "en", WordStatus::Pending), Some(user.id))
        .unwrap();

    let change = db.change_status(&cat.slug, "approved", Some(user.id)).unwrap();
    assert_eq!(change.old, WordStatus::Pending);
    assert_eq!(change.new, WordStatus::Approved);

    let err = db.change_status(&cat.slug, "published", None).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));

    let history = db.word_history(&cat.slug).unwrap();
    assert_eq!(history.changes.len(), 2);
    assert_eq!(history.changes[0].action, ChangeAction::StatusChanged);
    assert_eq!(history.changes[0].old_value.as_deref(), Some("pending"));
    assert_eq!(history.changes[1].action, ChangeAction::Created);
    assert_eq!(history.snapshots.len(), 2);
    assert_eq!(history.snapshots[0].data["status"], "approved");
}

// -- Categories, tags and completeness --

fn category(code: &str, name: &str) -> CategoryRequest {
    CategoryRequest {
        code: code.to_string(),
        name: name.to_string(),
        description: String::new(),
    }
}

#[test]
fn category_completeness_goes_from_zero_to_full() {
    let db = db_with(&[]);
    let animals = db.create_category(&category("animals", "Animals"), "en").unwrap();
    for (code, name) in [("en", "English"), ("ru", "Russian"), ("kk", "Kazakh"), ("de", "German")] {
        db.create_language(code, name).unwrap();
    }

    let empty = db.entity_completeness(EntityKind::Category, animals.id).unwrap();
    assert_eq!(empty.total, 4);
    assert_eq!(empty.percentage, 0);
    assert_eq!(empty.missing.len(), 4);

    let mut translations = BTreeMap::new();
    for (code, name) in [("en", "Animals"), ("ru", "Животные"), ("kk", "Жануарлар"), ("de", "Tiere")] {
        translations.insert(
            code.to_string(),
            LocalizedText {
                name: name.to_string(),
                description: String::new(),
            },
        );
    }
    db.update_category_translations(
        animals.id,
        &UpdateEntityTranslationsRequest {
            translations,
            display_mode: None,
        },
    )
    .unwrap();

    let full = db.entity_completeness(EntityKind::Category, animals.id).unwrap();
    assert_eq!(full.percentage, 100);
    assert!(full.missing.is_empty());
}

#[test]
fn fill_missing_creates_one_placeholder_per_gap() {
    let db = db_with(&[("en", "English")]);
    let animals = db.create_category(&category("animals", "Animals"), "en").unwrap();
    for (code, name) in [("ru", "Russian"), ("kk", "Kazakh"), ("de", "German")] {
        db.create_language(code, name).unwrap();
    }

    assert_eq!(db.fill_missing(EntityKind::Category, animals.id).unwrap(), 3);
    let names = db.category_translations(animals.id).unwrap().translations;
    assert_eq!(names["en"].name, "Animals");
    assert_eq!(names["ru"].name, "[ru] animals");
    assert_eq!(names["de"].name, "[de] animals");

    assert_eq!(db.bulk_fill(FillTarget::Categories).unwrap(), 0);
}

#[test]
fn bulk_fill_covers_a_category_known_in_one_of_four_languages() {
    let db = db_with(&[("en", "English")]);
    let animals = db.create_category(&category("animals", "Animals"), "en").unwrap();
    for (code, name) in [("ru", "Russian"), ("kk", "Kazakh"), ("de", "German")] {
        db.create_language(code, name).unwrap();
    }
    assert_eq!(
        db.entity_completeness(EntityKind::Category, animals.id).unwrap().percentage,
        25
    );

    assert_eq!(db.bulk_fill(FillTarget::Categories).unwrap(), 3);
    let names = db.category_translations(animals.id).unwrap().translations;
    assert_eq!(names.len(), 4);
    assert_eq!(names["en"].name, "Animals");
    assert_eq!(names["kk"].name, "[kk] animals");
    assert_eq!(
        db.entity_completeness(EntityKind::Category, animals.id).unwrap().percentage,
        100
    );

    assert_eq!(db.bulk_fill(FillTarget::Categories).unwrap(), 0);
}

#[test]
fn dashboard_and_progress_share_one_denominator() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    db.create_category(&category("animals", "Animals"), "en").unwrap();
    db.create_tag(
        &TagRequest {
            code: "noun".into(),
            name: "Noun".into(),
            display_mode: None,
        },
        "en",
    )
    .unwrap();
    db.create_language("kk", "Kazakh").unwrap();

    let dashboard = db.translation_dashboard().unwrap();
    assert_eq!(dashboard.total_languages, 3);
    assert_eq!(dashboard.categories[0].percentage, 67);
    assert_eq!(dashboard.fully_translated_categories, 0);
    assert_eq!(dashboard.untranslated_tags, 0);

    let progress = db.language_progress().unwrap();
    let kk = progress.iter().find(|p| p.code == "kk").unwrap();
    assert_eq!(kk.total_items, 2);
    assert_eq!(kk.percentage, 0.0);
    let en = progress.iter().find(|p| p.code == "en").unwrap();
    assert_eq!(en.percentage, 100.0);

    assert_eq!(db.bulk_fill(FillTarget::Tags).unwrap(), 1);
    let dashboard = db.translation_dashboard().unwrap();
    assert_eq!(dashboard.fully_translated_tags, 1);
}

#[test]
fn categories_in_use_cannot_be_deleted() {
    let db = db_with(&[("en", "English")]);
    let animals = db.create_category(&category("animals", "Animals"), "en").unwrap();
    assert_eq!(animals.slug, "animals");

    let err = db.create_category(&category("animals", "Again"), "en").unwrap_err();
    assert!(matches!(err, DbError::Conflict(m) if m.contains("already exists")));

    let mut word = payload("cat", "animal", "en", WordStatus::Approved);
    word.category_id = Some(animals.id);
    db.create_word(&word, None).unwrap();
    assert_eq!(db.get_category(animals.id, "en").unwrap().word_count, 1);

    let err = db.delete_category(animals.id).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));

    db.soft_delete_word("cat-en", None).unwrap();
    db.delete_category(animals.id).unwrap();
    assert!(matches!(db.get_category(animals.id, "en"), Err(DbError::NotFound(_))));
}

#[test]
fn display_name_falls_back_to_code() {
    let db = db_with(&[]);
    let tag = db
        .create_tag(
            &TagRequest {
                code: "slang".into(),
                name: "Slang".into(),
                display_mode: Some("hidden".into()),
            },
            "en",
        )
        .unwrap();
    assert_eq!(tag.name, "slang");
    assert_eq!(tag.display_mode.as_str(), "hidden");

    db.create_language("ru", "Russian").unwrap();
    db.fill_missing(EntityKind::Tag, tag.id).unwrap();
    // No name in the display language: the first translation wins.
    assert_eq!(db.get_tag(tag.id, "en").unwrap().name, "[ru] slang");
}

#[test]
fn interface_strings_fill_and_count() {
    let db = db_with(&[("en", "English"), ("ru", "Russian")]);
    let mut values = BTreeMap::new();
    values.insert(
        "nav.home".to_string(),
        BTreeMap::from([("en".to_string(), "Home".to_string()), ("ru".to_string(), String::new())]),
    );
    assert_eq!(db.update_interface(&values).unwrap(), 2);

    let grid = db.interface_grid().unwrap();
    assert_eq!(grid.keys["nav.home"]["en"], "Home");
    assert_eq!(grid.keys["nav.home"]["ru"], "");

    let dashboard = db.translation_dashboard().unwrap();
    assert_eq!(dashboard.interface_keys[0].percentage, 50);

    assert_eq!(db.bulk_fill(FillTarget::Interface).unwrap(), 1);
    let grid = db.interface_grid().unwrap();
    assert_eq!(grid.keys["nav.home"]["ru"], "[ru] nav.home");
}

// -- Interactions --

#[test]
fn favourites_likes_and_searches() {
    let db = db_with(&[("en", "English")]);
    let user = db.create_user("reader", "hash", Some("en")).unwrap();
    assert_eq!(user.preferred_language.as_deref(), Some("en"));
    let cat = db
        .create_word(&payload("cat", "animal", "en", WordStatus::Approved), None)
        .unwrap();

    assert!(db.toggle_favourite(user.id, &cat.slug).unwrap());
    assert_eq!(db.favourites(user.id).unwrap().len(), 1);
    assert!(!db.toggle_favourite(user.id, &cat.slug).unwrap());
    assert!(db.favourites(user.id).unwrap().is_empty());

    assert_eq!(db.set_like(user.id, &cat.slug, true).unwrap(), (1, 0));
    assert_eq!(db.set_like(user.id, &cat.slug, false).unwrap(), (0, 1));

    db.record_search(user.id, "cat").unwrap();
    db.record_search(user.id, "   ").unwrap();
    let searches = db.recent_searches(user.id).unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query, "cat");

    let example = db.add_example(&cat.slug, "The cat sleeps.", Some(user.id)).unwrap();
    let detail = db.word_detail(&cat.slug, false, "en").unwrap();
    assert_eq!(detail.examples[0].id, example.id);
    assert_eq!(detail.dislikes, 1);
}
