//! The built-in patch set for the avatar-upload wiring.
//!
//! Payloads are the exact blocks shipped to the frontend, including their
//! original indentation. Do not reflow them: matching is literal, and the
//! marker checks depend on these bytes.

use crate::patch::Patch;

/// Section header in `src/api/index.js` that the upload-avatar client block
/// is inserted in front of.
const API_DASHBOARD_ANCHOR: &str = "// 仪表盘";

/// Presence of the endpoint name anywhere in the API module means the
/// client block has already been wired in.
const API_MARKER: &str = "uploadAvatar:";

const API_UPLOAD_AVATAR_BLOCK: &str = "// 用户相关
  user: {
    uploadAvatar: (file) => {
      const formData = new FormData()
      formData.append('file', file)
      return http.post('/users/avatar', formData, {
        headers: { 'Content-Type': 'multipart/form-data' }
      })
    }
  },

  ";

/// The old Profile.vue handler routed the avatar through the generic file
/// upload endpoint and a full profile update.
const PROFILE_OLD_HANDLER: &str = "    const res = await api.file.upload(file)
    if (res.code === 200) {
      await userStore.updateProfile({ avatar: res.data })
      showToast({ message: '头像更新成功', icon: 'success' })
    }";

/// The new handler calls the dedicated endpoint, patches the store in place,
/// refreshes localStorage, and surfaces upload failures.
const PROFILE_NEW_HANDLER: &str = "    const res = await api.user.uploadAvatar(file)
    if (res.code === 200) {
      // 更新 store 中的用户信息
      userStore.user.avatar = res.data
      // 更新本地存储
      localStorage.setItem('user', JSON.stringify(userStore.user))
      showToast({ message: '头像更新成功', icon: 'success' })
    } else {
      showToast(res.message || '上传失败')
    }";

/// All patches this tool knows how to apply, in application order.
pub fn builtin_patches() -> Vec<Patch> {
    vec![
        Patch::insert_before(
            "api-upload-avatar",
            "src/api/index.js",
            API_DASHBOARD_ANCHOR,
            API_UPLOAD_AVATAR_BLOCK,
            API_MARKER,
        ),
        Patch::replace_block(
            "profile-avatar-handler",
            "src/views/Profile.vue",
            PROFILE_OLD_HANDLER,
            PROFILE_NEW_HANDLER,
        ),
    ]
}

/// Look up a subset of the built-in patches by name. Unknown names are an
/// error so a typo never silently applies nothing.
pub fn select_patches(names: &[String]) -> anyhow::Result<Vec<Patch>> {
    let all = builtin_patches();
    if names.is_empty() {
        return Ok(all);
    }

    let mut selected = Vec::new();
    for name in names {
        match all.iter().find(|p| p.name == *name) {
            Some(patch) => selected.push(patch.clone()),
            None => {
                let known: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
                anyhow::bail!(
                    "Unknown patch: '{}' (known patches: {})",
                    name,
                    known.join(", ")
                );
            }
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchOutcome;

    // Trimmed-down copy of the API module as it ships before wiring.
    const API_FIXTURE: &str = "import axios from 'axios'

const http = axios.create({ baseURL: '/api' })

export default {
  auth: {
    getMe: () => http.get('/auth/me')
  },

  // 仪表盘
  dashboard: {
    getData: () => http.get('/dashboard')
  }
}
";

    const PROFILE_FIXTURE: &str = "const onAvatarChange = async (file) => {
  try {
    const res = await api.file.upload(file)
    if (res.code === 200) {
      await userStore.updateProfile({ avatar: res.data })
      showToast({ message: '头像更新成功', icon: 'success' })
    }
  } finally {
    uploading.value = false
  }
}
";

    #[test]
    fn api_patch_inserts_user_section_before_dashboard() {
        let patches = builtin_patches();
        let (outcome, new) = patches[0].apply(API_FIXTURE);
        assert_eq!(outcome, PatchOutcome::Applied);

        let new = new.unwrap();
        assert!(new.contains("uploadAvatar: (file) =>"));
        // The user section must land above the dashboard section.
        let user_pos = new.find("user: {").unwrap();
        let dash_pos = new.find("dashboard: {").unwrap();
        assert!(user_pos < dash_pos);
        // Everything after the anchor is untouched.
        assert!(new.contains("// 仪表盘\n  dashboard: {"));
    }

    #[test]
    fn api_patch_is_idempotent() {
        let patches = builtin_patches();
        let (_, once) = patches[0].apply(API_FIXTURE);
        let once = once.unwrap();
        let (outcome, again) = patches[0].apply(&once);
        assert_eq!(outcome, PatchOutcome::AlreadyApplied);
        assert!(again.is_none());
    }

    #[test]
    fn profile_patch_swaps_handler_and_keeps_surroundings() {
        let patches = builtin_patches();
        let (outcome, new) = patches[1].apply(PROFILE_FIXTURE);
        assert_eq!(outcome, PatchOutcome::Applied);

        let new = new.unwrap();
        assert!(new.contains("api.user.uploadAvatar(file)"));
        assert!(!new.contains("api.file.upload(file)"));
        assert!(new.contains("localStorage.setItem('user'"));
        assert!(new.starts_with("const onAvatarChange"));
        assert!(new.ends_with("uploading.value = false\n  }\n}\n"));
    }

    #[test]
    fn profile_patch_reports_missing_handler() {
        let patches = builtin_patches();
        let (outcome, _) = patches[1].apply("<template></template>\n");
        assert_eq!(outcome, PatchOutcome::TargetMissing);
    }

    #[test]
    fn select_patches_by_name() {
        let selected =
            select_patches(&["profile-avatar-handler".to_string()]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "profile-avatar-handler");
    }

    #[test]
    fn select_patches_rejects_unknown_name() {
        let err = select_patches(&["no-such-patch".to_string()]).unwrap_err();
        assert!(err.to_string().contains("no-such-patch"));
        assert!(err.to_string().contains("api-upload-avatar"));
    }

    #[test]
    fn select_patches_empty_returns_all() {
        assert_eq!(select_patches(&[]).unwrap().len(), 2);
    }
}
