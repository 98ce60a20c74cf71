mod common;

use std::sync::atomic::Ordering;

use anyhow::Result;
use ramp_admin::forms::RampForm;
use ramp_admin::upload::file::content_type_for;
use ramp_admin::upload::{upload_files, HttpUploadBackend, UploadFile};
use ramp_admin::ApiError;

fn form() -> RampForm {
    RampForm {
        district: "마포구".to_string(),
        address: "월드컵북로 10".to_string(),
        trade_name: "망원 베이커리".to_string(),
        facility_type: "음식점".to_string(),
        width: "1.1".to_string(),
        latitude: None,
        longitude: None,
    }
}

fn images(names: &[&str]) -> Vec<UploadFile> {
    names
        .iter()
        .map(|name| {
            let content_type = content_type_for(name).unwrap_or_default();
            UploadFile::new(*name, content_type, vec![0x89, b'P', b'N', b'G', 1, 2, 3])
        })
        .collect()
}

#[tokio::test]
async fn images_upload_in_order_then_record_carries_keys() -> Result<()> {
    let api = common::start().await?;
    let context = api.signed_in().await?;

    context
        .ramps
        .create_with_images(&form(), &images(&["front.png", "side.jpg"]))
        .await?;

    assert_eq!(
        *api.state.upload_log.lock().unwrap(),
        vec![
            "presign:front.png",
            "put:ramps/front.png",
            "presign:side.jpg",
            "put:ramps/side.jpg",
        ]
    );

    let presigned = api.state.presigned.lock().unwrap().clone();
    assert_eq!(presigned[0]["contentType"], "image/png");
    assert_eq!(presigned[1]["contentType"], "image/jpeg");

    let puts = api.state.puts.lock().unwrap().clone();
    assert_eq!(puts[0].1, "image/png");
    assert_eq!(puts[0].2, 7);
    assert!(puts.iter().all(|(_, _, _, credentials)| !credentials));

    let created = api.state.created_bodies.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["imagesKeys"], serde_json::json!(["ramps/front.png", "ramps/side.jpg"]));
    assert_eq!(created[0]["tradeName"], "망원 베이커리");
    Ok(())
}

#[tokio::test]
async fn failing_put_aborts_remaining_files() -> Result<()> {
    let api = common::start().await?;
    *api.state.fail_put_for.lock().unwrap() = Some("b.png".to_string());
    let context = api.signed_in().await?;

    let err = context
        .ramps
        .create_with_images(&form(), &images(&["a.png", "b.png", "c.png"]))
        .await
        .unwrap_err();

    match err {
        ApiError::Upload {
            index,
            file_name,
            status,
            uploaded,
            message,
        } => {
            assert_eq!(index, 1);
            assert_eq!(file_name, "b.png");
            assert_eq!(status, Some(403));
            assert_eq!(uploaded, vec!["ramps/a.png"]);
            assert!(message.contains("파일 업로드에 실패했습니다."), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(api.state.presigned.lock().unwrap().len(), 2);
    assert_eq!(api.state.puts.lock().unwrap().len(), 2);
    assert!(api.state.created_bodies.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_input_sends_nothing() -> Result<()> {
    let api = common::start().await?;
    let context = api.signed_in().await?;

    let bad_form = RampForm {
        width: "0".to_string(),
        ..form()
    };
    let err = context
        .ramps
        .create_with_images(&bad_form, &images(&["a.png"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));

    let too_many: Vec<String> = (0..11).map(|i| format!("{}.png", i)).collect();
    let names: Vec<&str> = too_many.iter().map(String::as_str).collect();
    let err = context
        .ramps
        .create_with_images(&form(), &images(&names))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));

    assert!(api.state.presigned.lock().unwrap().is_empty());
    assert!(api.state.created_bodies.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn presign_retries_after_expired_token() -> Result<()> {
    let api = common::start().await?;
    let context = api.signed_in().await?;
    api.state.expire_token();

    let backend = HttpUploadBackend::new(&context.http);
    let uploaded = upload_files(&backend, &images(&["only.png"])).await?;

    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].key, "ramps/only.png");
    assert_eq!(api.state.refresh_calls.load(Ordering::SeqCst), 1);
    Ok(())
}
